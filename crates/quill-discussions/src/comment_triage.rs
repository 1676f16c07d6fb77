//! Per-comment triage state machine for proposed answers.
//!
//! A comment carrying the proposed-answer keyword resolves to exactly one
//! [`CommentTriageAction`]; the first matching rule wins:
//! negative reaction, positive reaction, no replies, engaged reply, staleness.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::discussion_classifiers::{
    contains_negative_reaction, contains_positive_reaction, exceeds_staleness_threshold_at,
    has_engaged_reply, has_replies,
};
use crate::discussion_repository::{DiscussionRepository, RepositoryResult};
use crate::discussion_types::DiscussionComment;
use crate::triage_config::{render_accepted_answer_body, TriageConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentTriageAction {
    LabelNegativeReaction,
    AcceptAnswer,
    PostInstructions,
    LabelEngagedReply,
    AcceptStaleAnswer,
    CloseAsStale,
    NoAction,
}

impl CommentTriageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LabelNegativeReaction => "label_negative_reaction",
            Self::AcceptAnswer => "accept_answer",
            Self::PostInstructions => "post_instructions",
            Self::LabelEngagedReply => "label_engaged_reply",
            Self::AcceptStaleAnswer => "accept_stale_answer",
            Self::CloseAsStale => "close_as_stale",
            Self::NoAction => "no_action",
        }
    }

    /// Accepting an answer or closing the discussion settles it; later proposals are not triaged.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AcceptAnswer | Self::AcceptStaleAnswer | Self::CloseAsStale
        )
    }
}

#[derive(Debug, Clone, Copy)]
/// Inputs shared by every comment triaged in one run.
pub struct CommentTriageContext<'a> {
    pub config: &'a TriageConfig,
    pub attention_label_id: &'a str,
    pub now: DateTime<Utc>,
}

pub fn decide_comment_action(
    comment: &DiscussionComment,
    config: &TriageConfig,
    now: DateTime<Utc>,
) -> CommentTriageAction {
    if contains_negative_reaction(comment) {
        return CommentTriageAction::LabelNegativeReaction;
    }
    if contains_positive_reaction(comment) {
        return CommentTriageAction::AcceptAnswer;
    }
    if !has_replies(comment) {
        return CommentTriageAction::PostInstructions;
    }
    if has_engaged_reply(comment, &config.bot_login, &config.instructions_text) {
        return CommentTriageAction::LabelEngagedReply;
    }
    if exceeds_staleness_threshold_at(comment, config.days_until_stale, now) {
        return if config.close_stale_as_answered {
            CommentTriageAction::AcceptStaleAnswer
        } else {
            CommentTriageAction::CloseAsStale
        };
    }
    CommentTriageAction::NoAction
}

/// Decide and apply the action for one keyword-carrying comment.
pub async fn triage_comment<R>(
    repository: &R,
    context: &CommentTriageContext<'_>,
    discussion_id: &str,
    comment: &DiscussionComment,
) -> RepositoryResult<CommentTriageAction>
where
    R: DiscussionRepository + ?Sized,
{
    let config = context.config;
    let action = decide_comment_action(comment, config, context.now);
    match action {
        CommentTriageAction::LabelNegativeReaction => {
            info!(
                discussion_id,
                comment_id = %comment.id,
                "negative reaction received, adding attention label"
            );
            repository
                .add_label(discussion_id, context.attention_label_id)
                .await?;
        }
        CommentTriageAction::AcceptAnswer => {
            info!(
                discussion_id,
                comment_id = %comment.id,
                "positive reaction received, accepting answer and closing discussion"
            );
            mark_comment_as_answer(repository, config, comment).await?;
            repository.close_as_resolved(discussion_id).await?;
            if config.lock_accepted_discussions {
                repository.lock(discussion_id).await?;
            }
        }
        CommentTriageAction::PostInstructions => {
            info!(
                discussion_id,
                comment_id = %comment.id,
                "no replies yet, posting instructions"
            );
            repository
                .add_reply(&config.instructions_text, discussion_id, &comment.id)
                .await?;
        }
        CommentTriageAction::LabelEngagedReply => {
            info!(
                discussion_id,
                comment_id = %comment.id,
                "non-bot reply without reactions, adding attention label"
            );
            repository
                .add_label(discussion_id, context.attention_label_id)
                .await?;
        }
        CommentTriageAction::AcceptStaleAnswer => {
            info!(
                discussion_id,
                comment_id = %comment.id,
                "no response before staleness threshold, marking answer"
            );
            mark_comment_as_answer(repository, config, comment).await?;
        }
        CommentTriageAction::CloseAsStale => {
            info!(
                discussion_id,
                comment_id = %comment.id,
                "no response before staleness threshold, closing as outdated"
            );
            repository
                .add_comment(discussion_id, &config.stale_response_text)
                .await?;
            repository.close_as_outdated(discussion_id).await?;
        }
        CommentTriageAction::NoAction => {
            info!(
                discussion_id,
                comment_id = %comment.id,
                "no triage action needed"
            );
        }
    }
    Ok(action)
}

async fn mark_comment_as_answer<R>(
    repository: &R,
    config: &TriageConfig,
    comment: &DiscussionComment,
) -> RepositoryResult<()>
where
    R: DiscussionRepository + ?Sized,
{
    let keyword = config.proposed_answer_keyword.as_str();
    // Prefer the markdown source so formatting survives the rewrite.
    let source = if comment.body.contains(keyword) {
        comment.body.as_str()
    } else {
        comment.body_text.as_str()
    };
    let updated = render_accepted_answer_body(source, keyword);
    repository.update_comment(&comment.id, &updated).await?;
    repository.mark_as_answer(&comment.id).await
}
