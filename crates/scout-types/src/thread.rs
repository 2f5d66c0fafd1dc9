use chrono::{DateTime, Utc};
use scout_llm::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: String,
    #[serde(default)]
    pub metadata: ThreadMetadata,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(thread_id: impl Into<String>, metadata: ThreadMetadata) -> Self {
        Self {
            thread_id: thread_id.into(),
            metadata,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ThreadMetadata {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            extra: Map::new(),
        }
    }
}

/// Behaviour when creating a thread whose id already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IfExists {
    #[default]
    DoNothing,
    Raise,
}

/// `POST /threads` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateThreadRequest {
    /// Server generates one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    #[serde(default)]
    pub metadata: ThreadMetadata,

    #[serde(default)]
    pub if_exists: IfExists,
}

impl CreateThreadRequest {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, metadata: ThreadMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn if_exists(mut self, if_exists: IfExists) -> Self {
        self.if_exists = if_exists;
        self
    }
}

/// `POST /threads/{id}/save` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveStateResponse {
    pub thread_id: String,
    pub saved: bool,
    pub message_count: usize,
}

/// `GET /threads/{id}/messages` response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_wire_format() {
        let request = CreateThreadRequest::new("t-1").with_metadata(ThreadMetadata::for_user("u-1"));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"thread_id": "t-1", "metadata": {"user_id": "u-1"}, "if_exists": "do_nothing"})
        );
    }

    #[test]
    fn test_create_request_defaults() {
        let request: CreateThreadRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.thread_id, None);
        assert_eq!(request.if_exists, IfExists::DoNothing);
    }

    #[test]
    fn test_metadata_keeps_extra_keys() {
        let metadata: ThreadMetadata =
            serde_json::from_value(json!({"user_id": "u", "source": "cli"})).unwrap();
        assert_eq!(metadata.user_id.as_deref(), Some("u"));
        assert_eq!(metadata.extra["source"], "cli");
    }
}
