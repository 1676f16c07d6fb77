//! Collaborator contract for the remote discussion host.

use async_trait::async_trait;
use thiserror::Error;

use crate::discussion_types::{DiscussionComment, DiscussionPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates the remote operations the triage engine can request.
pub enum DiscussionOperation {
    ResolveLabel,
    ListAnswerableCategories,
    CountDiscussions,
    ListDiscussions,
    CountComments,
    ListComments,
    AddLabel,
    CloseAsResolved,
    CloseAsOutdated,
    Reopen,
    Lock,
    AddComment,
    AddReply,
    UpdateComment,
    MarkAsAnswer,
}

impl DiscussionOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolveLabel => "resolve label",
            Self::ListAnswerableCategories => "list answerable categories",
            Self::CountDiscussions => "count discussions",
            Self::ListDiscussions => "list discussions",
            Self::CountComments => "count comments",
            Self::ListComments => "list comments",
            Self::AddLabel => "add label",
            Self::CloseAsResolved => "close discussion as resolved",
            Self::CloseAsOutdated => "close discussion as outdated",
            Self::Reopen => "reopen discussion",
            Self::Lock => "lock discussion",
            Self::AddComment => "add discussion comment",
            Self::AddReply => "add comment reply",
            Self::UpdateComment => "update comment",
            Self::MarkAsAnswer => "mark comment as answer",
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Self::ResolveLabel
                | Self::ListAnswerableCategories
                | Self::CountDiscussions
                | Self::ListDiscussions
                | Self::CountComments
                | Self::ListComments
        )
    }
}

impl std::fmt::Display for DiscussionOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("failed to {operation} for {target}: {message}")]
    Read {
        operation: DiscussionOperation,
        target: String,
        message: String,
    },
    #[error("failed to {operation} for {target}: {message}")]
    Mutation {
        operation: DiscussionOperation,
        target: String,
        message: String,
    },
}

impl RepositoryError {
    /// Builds a read or mutation error depending on the operation kind.
    pub fn for_operation(
        operation: DiscussionOperation,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let target = target.into();
        let message = message.into();
        if operation.is_mutation() {
            Self::Mutation {
                operation,
                target,
                message,
            }
        } else {
            Self::Read {
                operation,
                target,
                message,
            }
        }
    }

    pub fn operation(&self) -> DiscussionOperation {
        match self {
            Self::Read { operation, .. } | Self::Mutation { operation, .. } => *operation,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::Read { target, .. } | Self::Mutation { target, .. } => target,
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
/// Query and mutation surface of the discussion host consumed by the triage engine.
pub trait DiscussionRepository: Send + Sync {
    async fn resolve_label_id(&self, label_name: &str) -> RepositoryResult<Option<String>>;

    async fn list_answerable_category_ids(&self) -> RepositoryResult<Vec<String>>;

    async fn get_discussion_count(&self, category_id: &str) -> RepositoryResult<u64>;

    async fn get_discussion_page(
        &self,
        category_id: &str,
        page_size: usize,
        after: Option<&str>,
    ) -> RepositoryResult<DiscussionPage>;

    async fn get_comment_count(&self, discussion_number: u64) -> RepositoryResult<u64>;

    async fn get_comments(
        &self,
        discussion_number: u64,
        count: u64,
    ) -> RepositoryResult<Vec<DiscussionComment>>;

    async fn add_label(&self, discussion_id: &str, label_id: &str) -> RepositoryResult<()>;

    async fn close_as_resolved(&self, discussion_id: &str) -> RepositoryResult<()>;

    async fn close_as_outdated(&self, discussion_id: &str) -> RepositoryResult<()>;

    async fn reopen(&self, discussion_id: &str) -> RepositoryResult<()>;

    async fn lock(&self, discussion_id: &str) -> RepositoryResult<()>;

    async fn add_comment(&self, discussion_id: &str, body: &str) -> RepositoryResult<()>;

    async fn add_reply(
        &self,
        body: &str,
        discussion_id: &str,
        reply_to_comment_id: &str,
    ) -> RepositoryResult<()>;

    async fn update_comment(&self, comment_id: &str, body: &str) -> RepositoryResult<()>;

    async fn mark_as_answer(&self, comment_id: &str) -> RepositoryResult<()>;
}
