use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Reaction content values reported by the GitHub GraphQL API.
pub enum ReactionContent {
    ThumbsUp,
    ThumbsDown,
    Laugh,
    Hooray,
    Confused,
    Heart,
    Rocket,
    Eyes,
    #[serde(other)]
    Unknown,
}

impl ReactionContent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThumbsUp => "THUMBS_UP",
            Self::ThumbsDown => "THUMBS_DOWN",
            Self::Laugh => "LAUGH",
            Self::Hooray => "HOORAY",
            Self::Confused => "CONFUSED",
            Self::Heart => "HEART",
            Self::Rocket => "ROCKET",
            Self::Eyes => "EYES",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Second-level reply attached to a discussion comment.
pub struct CommentReply {
    #[serde(default)]
    pub author_login: Option<String>,
    #[serde(default)]
    pub body_text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Top-level comment within a discussion, with the reactions and replies needed for triage.
pub struct DiscussionComment {
    #[serde(default)]
    pub id: String,
    /// Markdown source; used when rewriting an accepted answer.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub body_text: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub reactions: Vec<ReactionContent>,
    #[serde(default)]
    pub replies: Vec<CommentReply>,
    #[serde(default)]
    pub reply_count: u64,
}

impl DiscussionComment {
    /// True when the comment carries enough data to be triaged.
    pub fn is_eligible(&self) -> bool {
        !self.id.trim().is_empty() && !self.body_text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// Read-only discussion snapshot fetched one page at a time.
pub struct Discussion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub closed: bool,
    /// Id of the comment currently marked as the answer, if any.
    #[serde(default)]
    pub answer_id: Option<String>,
    #[serde(default)]
    pub category_id: String,
}

impl Discussion {
    pub fn is_answered(&self) -> bool {
        self.answer_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionCategory {
    pub id: String,
    #[serde(default)]
    pub is_answerable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One page of discussions plus the cursor needed to request the next page.
pub struct DiscussionPage {
    pub discussions: Vec<Discussion>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}
