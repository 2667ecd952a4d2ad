//! Normalized message model: the reduced view of a Gmail message

use serde::{Deserialize, Serialize};

/// Unique identifier for a message (Gmail message ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a thread (Gmail thread ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A message reduced to the fields the service exposes
///
/// Built once per fetch and never mutated afterwards; it is either returned
/// to the caller or written to a backup file. Optional fields are omitted
/// from JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMessage {
    /// Gmail message ID
    pub id: MessageId,
    /// ID of the thread this message belongs to
    pub thread_id: ThreadId,
    /// Short plain-text preview
    #[serde(default)]
    pub snippet: String,
    /// Gmail's internal timestamp (epoch milliseconds, as a decimal string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Raw `Date` header, unparsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl NormalizedMessage {
    /// Create a new message builder
    pub fn builder(id: MessageId, thread_id: ThreadId) -> NormalizedMessageBuilder {
        NormalizedMessageBuilder::new(id, thread_id)
    }
}

/// Builder for creating NormalizedMessage instances
///
/// Empty strings passed to the optional setters are treated as absent.
pub struct NormalizedMessageBuilder {
    message: NormalizedMessage,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl NormalizedMessageBuilder {
    fn new(id: MessageId, thread_id: ThreadId) -> Self {
        Self {
            message: NormalizedMessage {
                id,
                thread_id,
                snippet: String::new(),
                internal_date: None,
                from: None,
                to: None,
                subject: None,
                date: None,
            },
        }
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.message.snippet = snippet.into();
        self
    }

    pub fn internal_date(mut self, internal_date: Option<String>) -> Self {
        self.message.internal_date = non_empty(internal_date);
        self
    }

    pub fn from(mut self, from: Option<String>) -> Self {
        self.message.from = non_empty(from);
        self
    }

    pub fn to(mut self, to: Option<String>) -> Self {
        self.message.to = non_empty(to);
        self
    }

    pub fn subject(mut self, subject: Option<String>) -> Self {
        self.message.subject = non_empty(subject);
        self
    }

    pub fn date(mut self, date: Option<String>) -> Self {
        self.message.date = non_empty(date);
        self
    }

    pub fn build(self) -> NormalizedMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case_and_skips_absent_fields() {
        let msg = NormalizedMessage::builder(MessageId::new("m1"), ThreadId::new("t1"))
            .snippet("hello")
            .internal_date(Some("1700000000000".to_string()))
            .subject(Some("Hi".to_string()))
            .build();

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "m1",
                "threadId": "t1",
                "snippet": "hello",
                "internalDate": "1700000000000",
                "subject": "Hi",
            })
        );
    }

    #[test]
    fn test_empty_optional_values_are_absent() {
        let msg = NormalizedMessage::builder(MessageId::new("m1"), ThreadId::new("t1"))
            .from(Some(String::new()))
            .to(None)
            .build();
        assert_eq!(msg.from, None);
        assert_eq!(msg.to, None);
        assert_eq!(msg.snippet, "");
    }

    #[test]
    fn test_deserialize_minimal() {
        let msg: NormalizedMessage =
            serde_json::from_str(r#"{"id":"m1","threadId":"t1"}"#).unwrap();
        assert_eq!(msg.id.as_str(), "m1");
        assert_eq!(msg.thread_id.as_str(), "t1");
        assert_eq!(msg.snippet, "");
        assert_eq!(msg.date, None);
    }
}
