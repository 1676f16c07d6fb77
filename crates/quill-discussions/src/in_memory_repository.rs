//! Scripted `DiscussionRepository` that serves a fixed snapshot and records mutations.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::discussion_repository::{
    DiscussionOperation, DiscussionRepository, RepositoryError, RepositoryResult,
};
use crate::discussion_types::{Discussion, DiscussionCategory, DiscussionComment, DiscussionPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    AddLabel {
        discussion_id: String,
        label_id: String,
    },
    CloseAsResolved {
        discussion_id: String,
    },
    CloseAsOutdated {
        discussion_id: String,
    },
    Reopen {
        discussion_id: String,
    },
    Lock {
        discussion_id: String,
    },
    AddComment {
        discussion_id: String,
        body: String,
    },
    AddReply {
        body: String,
        discussion_id: String,
        reply_to_comment_id: String,
    },
    UpdateComment {
        comment_id: String,
        body: String,
    },
    MarkAsAnswer {
        comment_id: String,
    },
}

#[derive(Debug, Default)]
pub struct InMemoryDiscussionRepository {
    labels: HashMap<String, String>,
    categories: Vec<DiscussionCategory>,
    discussions: Vec<Discussion>,
    comments: HashMap<u64, Vec<DiscussionComment>>,
    failing_operations: HashSet<DiscussionOperation>,
    calls: Mutex<Vec<RecordedCall>>,
    page_requests: Mutex<Vec<(String, Option<String>)>>,
}

impl InMemoryDiscussionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, name: &str, id: &str) -> Self {
        self.labels.insert(name.to_string(), id.to_string());
        self
    }

    pub fn with_category(mut self, id: &str, is_answerable: bool) -> Self {
        self.categories.push(DiscussionCategory {
            id: id.to_string(),
            is_answerable,
        });
        self
    }

    pub fn with_discussion(mut self, discussion: Discussion) -> Self {
        self.discussions.push(discussion);
        self
    }

    pub fn with_comments(
        mut self,
        discussion_number: u64,
        comments: Vec<DiscussionComment>,
    ) -> Self {
        self.comments.insert(discussion_number, comments);
        self
    }

    /// Make every call to `operation` fail.
    pub fn failing(mut self, operation: DiscussionOperation) -> Self {
        self.failing_operations.insert(operation);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock_ignoring_poison(&self.calls).clone()
    }

    /// `(category_id, after_cursor)` pairs in request order.
    pub fn page_requests(&self) -> Vec<(String, Option<String>)> {
        lock_ignoring_poison(&self.page_requests).clone()
    }

    fn check(&self, operation: DiscussionOperation, target: &str) -> RepositoryResult<()> {
        if self.failing_operations.contains(&operation) {
            return Err(RepositoryError::for_operation(
                operation,
                target,
                "scripted failure",
            ));
        }
        Ok(())
    }

    fn record(
        &self,
        operation: DiscussionOperation,
        target: &str,
        call: RecordedCall,
    ) -> RepositoryResult<()> {
        self.check(operation, target)?;
        lock_ignoring_poison(&self.calls).push(call);
        Ok(())
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DiscussionRepository for InMemoryDiscussionRepository {
    async fn resolve_label_id(&self, label_name: &str) -> RepositoryResult<Option<String>> {
        self.check(DiscussionOperation::ResolveLabel, label_name)?;
        Ok(self.labels.get(label_name).cloned())
    }

    async fn list_answerable_category_ids(&self) -> RepositoryResult<Vec<String>> {
        self.check(DiscussionOperation::ListAnswerableCategories, "repository")?;
        Ok(self
            .categories
            .iter()
            .filter(|category| category.is_answerable)
            .map(|category| category.id.clone())
            .collect())
    }

    async fn get_discussion_count(&self, category_id: &str) -> RepositoryResult<u64> {
        self.check(DiscussionOperation::CountDiscussions, category_id)?;
        Ok(self
            .discussions
            .iter()
            .filter(|discussion| discussion.category_id == category_id)
            .count() as u64)
    }

    async fn get_discussion_page(
        &self,
        category_id: &str,
        page_size: usize,
        after: Option<&str>,
    ) -> RepositoryResult<DiscussionPage> {
        lock_ignoring_poison(&self.page_requests)
            .push((category_id.to_string(), after.map(str::to_string)));
        self.check(DiscussionOperation::ListDiscussions, category_id)?;
        let start = after
            .and_then(|cursor| cursor.parse::<usize>().ok())
            .unwrap_or(0);
        let in_category = self
            .discussions
            .iter()
            .filter(|discussion| discussion.category_id == category_id)
            .collect::<Vec<_>>();
        let end = start.saturating_add(page_size.max(1)).min(in_category.len());
        let discussions = in_category
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|discussion| (*discussion).clone())
            .collect();
        Ok(DiscussionPage {
            discussions,
            has_next_page: end < in_category.len(),
            end_cursor: Some(end.to_string()),
        })
    }

    async fn get_comment_count(&self, discussion_number: u64) -> RepositoryResult<u64> {
        self.check(
            DiscussionOperation::CountComments,
            &format!("#{discussion_number}"),
        )?;
        Ok(self
            .comments
            .get(&discussion_number)
            .map(|comments| comments.len() as u64)
            .unwrap_or(0))
    }

    async fn get_comments(
        &self,
        discussion_number: u64,
        count: u64,
    ) -> RepositoryResult<Vec<DiscussionComment>> {
        self.check(
            DiscussionOperation::ListComments,
            &format!("#{discussion_number}"),
        )?;
        Ok(self
            .comments
            .get(&discussion_number)
            .map(|comments| {
                comments
                    .iter()
                    .take(usize::try_from(count).unwrap_or(usize::MAX))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn add_label(&self, discussion_id: &str, label_id: &str) -> RepositoryResult<()> {
        self.record(
            DiscussionOperation::AddLabel,
            discussion_id,
            RecordedCall::AddLabel {
                discussion_id: discussion_id.to_string(),
                label_id: label_id.to_string(),
            },
        )
    }

    async fn close_as_resolved(&self, discussion_id: &str) -> RepositoryResult<()> {
        self.record(
            DiscussionOperation::CloseAsResolved,
            discussion_id,
            RecordedCall::CloseAsResolved {
                discussion_id: discussion_id.to_string(),
            },
        )
    }

    async fn close_as_outdated(&self, discussion_id: &str) -> RepositoryResult<()> {
        self.record(
            DiscussionOperation::CloseAsOutdated,
            discussion_id,
            RecordedCall::CloseAsOutdated {
                discussion_id: discussion_id.to_string(),
            },
        )
    }

    async fn reopen(&self, discussion_id: &str) -> RepositoryResult<()> {
        self.record(
            DiscussionOperation::Reopen,
            discussion_id,
            RecordedCall::Reopen {
                discussion_id: discussion_id.to_string(),
            },
        )
    }

    async fn lock(&self, discussion_id: &str) -> RepositoryResult<()> {
        self.record(
            DiscussionOperation::Lock,
            discussion_id,
            RecordedCall::Lock {
                discussion_id: discussion_id.to_string(),
            },
        )
    }

    async fn add_comment(&self, discussion_id: &str, body: &str) -> RepositoryResult<()> {
        self.record(
            DiscussionOperation::AddComment,
            discussion_id,
            RecordedCall::AddComment {
                discussion_id: discussion_id.to_string(),
                body: body.to_string(),
            },
        )
    }

    async fn add_reply(
        &self,
        body: &str,
        discussion_id: &str,
        reply_to_comment_id: &str,
    ) -> RepositoryResult<()> {
        self.record(
            DiscussionOperation::AddReply,
            reply_to_comment_id,
            RecordedCall::AddReply {
                body: body.to_string(),
                discussion_id: discussion_id.to_string(),
                reply_to_comment_id: reply_to_comment_id.to_string(),
            },
        )
    }

    async fn update_comment(&self, comment_id: &str, body: &str) -> RepositoryResult<()> {
        self.record(
            DiscussionOperation::UpdateComment,
            comment_id,
            RecordedCall::UpdateComment {
                comment_id: comment_id.to_string(),
                body: body.to_string(),
            },
        )
    }

    async fn mark_as_answer(&self, comment_id: &str) -> RepositoryResult<()> {
        self.record(
            DiscussionOperation::MarkAsAnswer,
            comment_id,
            RecordedCall::MarkAsAnswer {
                comment_id: comment_id.to_string(),
            },
        )
    }
}
