//! Role badges: the one-character marker in front of a chatter's name.
//!
//! The `badges` tag is a comma-separated list of `name/version` pairs, e.g.
//! `broadcaster/1,subscriber/12,glhf-pledge/1`. Only two roles are shown:
//!
//! | Badge | Roles                         |
//! |-------|-------------------------------|
//! | `@`   | `moderator`, `broadcaster`    |
//! | `+`   | `subscriber`                  |
//!
//! Moderator wins when both are present. Matching is by substring, so
//! versioned names and unusual separators still match.

/// A chatter's displayed role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Badge {
    /// Moderator or broadcaster.
    Moderator,
    /// Subscriber.
    Subscriber,
    /// Everyone else.
    #[default]
    None,
}

impl Badge {
    /// Derive the badge from a raw `badges` tag. A missing tag means no badge.
    #[must_use]
    pub fn from_tag(badges: Option<&str>) -> Self {
        let Some(badges) = badges else {
            return Self::None;
        };

        if badges.contains("moderator") || badges.contains("broadcaster") {
            Self::Moderator
        } else if badges.contains("subscriber") {
            Self::Subscriber
        } else {
            Self::None
        }
    }

    /// The marker text: `"@"`, `"+"`, or `""`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Moderator => "@",
            Self::Subscriber => "+",
            Self::None => "",
        }
    }
}

/// Shorthand for `Badge::from_tag(badges).as_str()`.
#[must_use]
pub fn role_badge(badges: Option<&str>) -> &'static str {
    Badge::from_tag(badges).as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderator_beats_subscriber() {
        assert_eq!(role_badge(Some("moderator/1,subscriber/12")), "@");
        assert_eq!(role_badge(Some("subscriber/12,moderator/1")), "@");
    }

    #[test]
    fn broadcaster_is_a_moderator() {
        assert_eq!(Badge::from_tag(Some("broadcaster/1")), Badge::Moderator);
    }

    #[test]
    fn subscriber_only() {
        assert_eq!(role_badge(Some("subscriber/6")), "+");
    }

    #[test]
    fn other_badges_show_nothing() {
        assert_eq!(role_badge(Some("premium/1,glhf-pledge/1")), "");
        assert_eq!(role_badge(Some("founder/0")), "");
    }

    #[test]
    fn empty_and_missing_tags_show_nothing() {
        assert_eq!(role_badge(Some("")), "");
        assert_eq!(role_badge(None), "");
        assert_eq!(Badge::default(), Badge::None);
    }
}
