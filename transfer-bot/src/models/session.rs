//! Per-chat connection settings.

use std::fmt;

/// Identity of the chat a command arrived from. Sessions are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        ChatId(id)
    }
}

/// The two connection strings configured for one chat.
///
/// Either URI may be unset. Values are stored exactly as supplied; nothing
/// checks that they are well-formed until a connection is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub source_uri: Option<String>,
    pub target_uri: Option<String>,
}

impl Session {
    /// Both URIs, or `None` while the session is incomplete.
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match (&self.source_uri, &self.target_uri) {
            (Some(source), Some(target)) => Some((source.as_str(), target.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_incomplete() {
        assert_eq!(Session::default().endpoints(), None);
    }

    #[test]
    fn session_with_one_uri_is_incomplete() {
        let session = Session {
            source_uri: Some("mongodb://a/src".to_string()),
            target_uri: None,
        };
        assert_eq!(session.endpoints(), None);
    }

    #[test]
    fn session_with_both_uris_exposes_endpoints() {
        let session = Session {
            source_uri: Some("mongodb://a/src".to_string()),
            target_uri: Some("mongodb://b/dst".to_string()),
        };
        assert_eq!(
            session.endpoints(),
            Some(("mongodb://a/src", "mongodb://b/dst"))
        );
    }
}
