use serde::{Deserialize, Serialize};

// Server-assigned user identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Server-assigned chat identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identity, tagged so a client-local echo id can never collide
/// with a server-assigned id.
///
/// `Provisional` ids come from a monotonic per-session counter and exist
/// only between the optimistic local append and the server confirmation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MessageId {
    Provisional(u64),
    Confirmed(i64),
}

impl MessageId {
    /// The server-assigned id, if this message has been confirmed.
    pub fn confirmed(self) -> Option<i64> {
        match self {
            MessageId::Confirmed(id) => Some(id),
            MessageId::Provisional(_) => None,
        }
    }

    pub fn is_provisional(self) -> bool {
        matches!(self, MessageId::Provisional(_))
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageId::Provisional(n) => write!(f, "local:{n}"),
            MessageId::Confirmed(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Direct,
    Group,
}

/// Delivery state of a message as shown in the transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
    Failed,
}

/// State of the realtime channel as reported to the UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_accessor() {
        assert_eq!(MessageId::Confirmed(42).confirmed(), Some(42));
        assert_eq!(MessageId::Provisional(42).confirmed(), None);
    }

    #[test]
    fn test_provisional_never_equals_confirmed() {
        // Same inner value, different domains.
        assert_ne!(MessageId::Provisional(7), MessageId::Confirmed(7));
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&MessageStatus::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
        let kind: ChatKind = serde_json::from_str("\"direct\"").unwrap();
        assert_eq!(kind, ChatKind::Direct);
    }
}
