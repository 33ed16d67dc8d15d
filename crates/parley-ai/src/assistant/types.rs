//! Thread, message, run and assistant types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Role;

/// Provider-side conversation history handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: i64,
}

/// One turn in a thread. `content` is the first text block of the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub thread_id: String,
    pub role: Role,
    pub content: Option<String>,
    /// Unix timestamp in seconds.
    pub created_at: i64,
}

/// A message as returned by the provider: a list of typed content parts.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireMessage {
    pub id: String,
    pub thread_id: String,
    pub role: Role,
    #[serde(default)]
    pub content: Vec<ContentPart>,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentPart {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TextContent {
    pub value: String,
}

impl From<WireMessage> for ThreadMessage {
    fn from(msg: WireMessage) -> Self {
        // First part only; a text part after an image is ignored.
        let content = match msg.content.into_iter().next() {
            Some(ContentPart::Text { text }) => Some(text.value),
            _ => None,
        };
        Self {
            id: msg.id,
            thread_id: msg.thread_id,
            role: msg.role,
            content,
            created_at: msg.created_at,
        }
    }
}

/// Status of a run. Transitions are driven by the provider only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Expired,
    /// Any status this client does not model; treated as non-terminal.
    Unknown(String),
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Expired => "expired",
            RunStatus::Unknown(other) => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Expired
        )
    }
}

impl From<&str> for RunStatus {
    fn from(value: &str) -> Self {
        match value {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            "expired" => RunStatus::Expired,
            other => RunStatus::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RunStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RunStatus::from(raw.as_str()))
    }
}

/// The provider's explanation for a failed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

/// One asynchronous processing job on a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub assistant_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Immutable provider-side assistant configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantInfo {
    pub name: Option<String>,
    pub model: String,
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<serde_json::Value>,
}

/// Sort order for message listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    Asc,
    #[default]
    Desc,
}

impl ListOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            ListOrder::Asc => "asc",
            ListOrder::Desc => "desc",
        }
    }
}

/// A message formatted for display or logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: Option<String>,
    pub created_at: i64,
    pub id: String,
}

impl From<ThreadMessage> for HistoryEntry {
    fn from(msg: ThreadMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content,
            created_at: msg.created_at,
            id: msg.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_message_takes_first_text_block_only() {
        let json = serde_json::json!({
            "id": "msg_1",
            "object": "thread.message",
            "thread_id": "thread_1",
            "role": "assistant",
            "created_at": 1_700_000_000,
            "content": [
                {"type": "text", "text": {"value": "first", "annotations": []}},
                {"type": "text", "text": {"value": "second", "annotations": []}}
            ]
        });
        let wire: WireMessage = serde_json::from_value(json).unwrap();
        let msg = ThreadMessage::from(wire);
        assert_eq!(msg.content.as_deref(), Some("first"));
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.created_at, 1_700_000_000);
    }

    #[test]
    fn wire_message_without_text_has_no_content() {
        let json = serde_json::json!({
            "id": "msg_2",
            "thread_id": "thread_1",
            "role": "user",
            "created_at": 1,
            "content": [{"type": "image_file", "image_file": {"file_id": "file_1"}}]
        });
        let msg = ThreadMessage::from(serde_json::from_value::<WireMessage>(json).unwrap());
        assert_eq!(msg.content, None);

        let json = serde_json::json!({
            "id": "msg_3", "thread_id": "thread_1", "role": "user", "content": []
        });
        let msg = ThreadMessage::from(serde_json::from_value::<WireMessage>(json).unwrap());
        assert_eq!(msg.content, None);
    }

    #[test]
    fn run_status_parses_known_and_unknown_values() {
        let run: Run = serde_json::from_value(serde_json::json!({
            "id": "run_1",
            "thread_id": "thread_1",
            "assistant_id": "asst_1",
            "status": "in_progress"
        }))
        .unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
        assert!(!run.status.is_terminal());

        let status: RunStatus = serde_json::from_str("\"requires_action\"").unwrap();
        assert_eq!(status, RunStatus::Unknown("requires_action".into()));
        assert!(!status.is_terminal());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"requires_action\"");
    }

    #[test]
    fn terminal_statuses() {
        for status in [RunStatus::Completed, RunStatus::Failed, RunStatus::Expired] {
            assert!(status.is_terminal(), "{status} should be terminal");
        }
        for status in [RunStatus::Queued, RunStatus::InProgress] {
            assert!(!status.is_terminal(), "{status} should not be terminal");
        }
    }

    #[test]
    fn history_entry_keeps_every_field() {
        let msg = ThreadMessage {
            id: "msg_9".into(),
            thread_id: "thread_1".into(),
            role: Role::User,
            content: Some("hello".into()),
            created_at: 42,
        };
        let entry = HistoryEntry::from(msg);
        assert_eq!(entry.id, "msg_9");
        assert_eq!(entry.role, Role::User);
        assert_eq!(entry.content.as_deref(), Some("hello"));
        assert_eq!(entry.created_at, 42);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn assistant_info_defaults_missing_tools() {
        let info: AssistantInfo = serde_json::from_value(serde_json::json!({
            "id": "asst_1",
            "name": "Helper",
            "model": "gpt-4o-mini",
            "instructions": null
        }))
        .unwrap();
        assert_eq!(info.name.as_deref(), Some("Helper"));
        assert!(info.tools.is_empty());
        assert_eq!(info.instructions, None);
    }
}
