//! Classifies the workflow invocation from `GITHUB_EVENT_NAME` and the event payload file.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

const DISCUSSION_COMMENT_EVENT: &str = "discussion_comment";
const CREATED_ACTION: &str = "created";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Comment freshly created on a discussion.
pub struct NewCommentEvent {
    pub discussion_id: String,
    pub comment_id: String,
    pub body: String,
    /// True when the comment is itself a reply to another comment.
    pub is_reply: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    NewComment(NewCommentEvent),
    Sweep,
}

impl TriggerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewComment(_) => "new_comment",
            Self::Sweep => "sweep",
        }
    }

    /// Builds the trigger from an already-parsed event payload.
    pub fn from_payload(event_name: &str, payload: &Value) -> Result<Self> {
        if event_name.trim() != DISCUSSION_COMMENT_EVENT {
            return Ok(Self::Sweep);
        }
        let action = payload
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if action != CREATED_ACTION {
            return Ok(Self::Sweep);
        }

        let comment = payload
            .get("comment")
            .ok_or_else(|| anyhow!("discussion_comment payload is missing 'comment'"))?;
        let discussion_id = payload
            .get("discussion")
            .and_then(|discussion| discussion.get("node_id"))
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| anyhow!("discussion_comment payload is missing 'discussion.node_id'"))?;
        let comment_id = comment
            .get("node_id")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| anyhow!("discussion_comment payload is missing 'comment.node_id'"))?;
        let body = comment
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let is_reply = comment
            .get("parent_id")
            .map(|parent| !parent.is_null())
            .unwrap_or(false);

        Ok(Self::NewComment(NewCommentEvent {
            discussion_id: discussion_id.to_string(),
            comment_id: comment_id.to_string(),
            body: body.to_string(),
            is_reply,
        }))
    }

    /// Reads the trigger from the workflow environment. Without an event name the
    /// invocation is treated as a sweep.
    pub fn load(event_name: Option<&str>, event_path: Option<&Path>) -> Result<Self> {
        let Some(event_name) = event_name.filter(|name| !name.trim().is_empty()) else {
            return Ok(Self::Sweep);
        };
        if event_name.trim() != DISCUSSION_COMMENT_EVENT {
            return Ok(Self::Sweep);
        }
        let path = event_path
            .ok_or_else(|| anyhow!("event '{event_name}' requires --event-path"))?;
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event payload {}", path.display()))?;
        let payload: Value = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse event payload {}", path.display()))?;
        Self::from_payload(event_name, &payload)
    }
}
