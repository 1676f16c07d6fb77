use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use quill_discussions::comment_triage::{triage_comment, CommentTriageAction, CommentTriageContext};
use quill_discussions::discussion_classifiers::{contains_keyword, text_contains_keyword};
use quill_discussions::discussion_filter::{
    evaluate_discussion, DiscussionDisposition, SkipFollowUp,
};
use quill_discussions::discussion_repository::{DiscussionRepository, RepositoryError};
use quill_discussions::discussion_types::Discussion;
use quill_discussions::triage_config::TriageConfig;
use tracing::{debug, error, info, warn};

use crate::github_graphql_client::{GithubGraphqlClient, RepoRef};
use crate::trigger_event::{NewCommentEvent, TriggerEvent};

#[derive(Debug, Clone)]
/// Runtime configuration for one invocation of the discussions bot.
pub struct DiscussionTriageRuntimeConfig {
    pub triage: TriageConfig,
    pub repo_slug: String,
    pub api_base: String,
    pub token: String,
    pub attention_label: String,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub trigger: TriggerEvent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Counters accumulated over one run.
pub struct TriageRunReport {
    pub categories: usize,
    pub discussions_scanned: usize,
    pub discussions_skipped: usize,
    pub discussions_triaged: usize,
    pub comments_triaged: usize,
    pub labeled: usize,
    pub answers_accepted: usize,
    pub instructions_posted: usize,
    pub stale_closed: usize,
    pub stale_accepted: usize,
    pub no_action: usize,
    pub follow_ups_applied: usize,
    pub failed_discussions: usize,
    pub failures: Vec<String>,
}

impl TriageRunReport {
    fn record_action(&mut self, action: CommentTriageAction) {
        self.comments_triaged += 1;
        match action {
            CommentTriageAction::LabelNegativeReaction
            | CommentTriageAction::LabelEngagedReply => self.labeled += 1,
            CommentTriageAction::AcceptAnswer => self.answers_accepted += 1,
            CommentTriageAction::PostInstructions => self.instructions_posted += 1,
            CommentTriageAction::AcceptStaleAnswer => self.stale_accepted += 1,
            CommentTriageAction::CloseAsStale => self.stale_closed += 1,
            CommentTriageAction::NoAction => self.no_action += 1,
        }
    }

    fn record_failure(&mut self, error: &RepositoryError) {
        self.failed_discussions += 1;
        self.failures.push(error.to_string());
    }
}

/// Runs the discussions bot against the GitHub GraphQL API.
pub async fn run_discussion_triage(config: DiscussionTriageRuntimeConfig) -> Result<TriageRunReport> {
    let repo = RepoRef::parse(&config.repo_slug)?;
    let client = GithubGraphqlClient::new(
        config.api_base.clone(),
        config.token.clone(),
        repo,
        config.request_timeout_ms,
        config.retry_max_attempts,
        config.retry_base_delay_ms,
    )?;
    run_discussion_triage_with_repository(
        &client,
        &config.triage,
        &config.attention_label,
        &config.trigger,
        Utc::now(),
    )
    .await
}

/// Resolves the attention label, dispatches the trigger, and fails when any
/// discussion hit a mutation error.
pub async fn run_discussion_triage_with_repository<R>(
    repository: &R,
    triage: &TriageConfig,
    attention_label: &str,
    trigger: &TriggerEvent,
    now: DateTime<Utc>,
) -> Result<TriageRunReport>
where
    R: DiscussionRepository + ?Sized,
{
    let attention_label_id = repository
        .resolve_label_id(attention_label)
        .await
        .with_context(|| format!("failed to resolve attention label '{attention_label}'"))?
        .ok_or_else(|| {
            anyhow!("attention label '{attention_label}' does not exist in the repository")
        })?;
    let context = CommentTriageContext {
        config: triage,
        attention_label_id: &attention_label_id,
        now,
    };

    info!(trigger = trigger.as_str(), "starting discussion triage");
    let report = dispatch_trigger(repository, &context, trigger).await;
    info!(
        categories = report.categories,
        discussions_scanned = report.discussions_scanned,
        discussions_skipped = report.discussions_skipped,
        discussions_triaged = report.discussions_triaged,
        comments_triaged = report.comments_triaged,
        labeled = report.labeled,
        answers_accepted = report.answers_accepted,
        instructions_posted = report.instructions_posted,
        stale_closed = report.stale_closed,
        stale_accepted = report.stale_accepted,
        follow_ups_applied = report.follow_ups_applied,
        failed_discussions = report.failed_discussions,
        "discussion triage finished"
    );
    if report.failed_discussions > 0 {
        bail!(
            "discussion triage finished with {} failed discussion(s): {}",
            report.failed_discussions,
            report.failures.join("; ")
        );
    }
    Ok(report)
}

pub async fn dispatch_trigger<R>(
    repository: &R,
    context: &CommentTriageContext<'_>,
    trigger: &TriggerEvent,
) -> TriageRunReport
where
    R: DiscussionRepository + ?Sized,
{
    match trigger {
        TriggerEvent::NewComment(event) => handle_new_comment(repository, context, event).await,
        TriggerEvent::Sweep => process_discussions(repository, context).await,
    }
}

async fn handle_new_comment<R>(
    repository: &R,
    context: &CommentTriageContext<'_>,
    event: &NewCommentEvent,
) -> TriageRunReport
where
    R: DiscussionRepository + ?Sized,
{
    let mut report = TriageRunReport::default();
    let config = context.config;
    if !text_contains_keyword(&event.body, &config.proposed_answer_keyword) {
        debug!(comment_id = %event.comment_id, "new comment has no proposed answer keyword");
        return report;
    }
    if event.is_reply {
        // Replies cannot be nested, so there is nowhere to post instructions.
        debug!(comment_id = %event.comment_id, "ignoring proposed answer posted as a reply");
        return report;
    }

    info!(
        discussion_id = %event.discussion_id,
        comment_id = %event.comment_id,
        "new proposed answer, posting instructions"
    );
    match repository
        .add_reply(
            &config.instructions_text,
            &event.discussion_id,
            &event.comment_id,
        )
        .await
    {
        Ok(()) => report.record_action(CommentTriageAction::PostInstructions),
        Err(error) => {
            error!(discussion_id = %event.discussion_id, %error, "failed to post instructions");
            report.record_failure(&error);
        }
    }
    report
}

/// Sweeps every answerable category, page by page.
pub async fn process_discussions<R>(
    repository: &R,
    context: &CommentTriageContext<'_>,
) -> TriageRunReport
where
    R: DiscussionRepository + ?Sized,
{
    let mut report = TriageRunReport::default();
    let categories = match repository.list_answerable_category_ids().await {
        Ok(categories) => categories,
        Err(error) => {
            warn!(%error, "unable to list answerable categories");
            Vec::new()
        }
    };
    if categories.is_empty() {
        info!("no answerable discussion categories found");
        return report;
    }

    for category_id in &categories {
        report.categories += 1;
        match repository.get_discussion_count(category_id).await {
            Ok(total) => debug!(category_id = %category_id, total, "scanning category"),
            Err(error) => warn!(category_id = %category_id, %error, "unable to count discussions"),
        }

        let page_size = context.config.page_size.max(1);
        let mut after: Option<String> = None;
        loop {
            let page = match repository
                .get_discussion_page(category_id, page_size, after.as_deref())
                .await
            {
                Ok(page) => page,
                Err(error) => {
                    warn!(category_id = %category_id, %error, "unable to fetch discussion page");
                    break;
                }
            };
            debug!(
                category_id = %category_id,
                discussions = page.discussions.len(),
                has_next_page = page.has_next_page,
                "fetched discussion page"
            );
            for discussion in &page.discussions {
                process_discussion(repository, context, discussion, &mut report).await;
            }

            match page.end_cursor {
                Some(cursor) if page.has_next_page => {
                    if after.as_deref() == Some(cursor.as_str()) {
                        warn!(category_id = %category_id, "discussion cursor did not advance");
                        break;
                    }
                    after = Some(cursor);
                }
                _ => break,
            }
        }
    }
    report
}

async fn process_discussion<R>(
    repository: &R,
    context: &CommentTriageContext<'_>,
    discussion: &Discussion,
    report: &mut TriageRunReport,
) where
    R: DiscussionRepository + ?Sized,
{
    report.discussions_scanned += 1;
    let disposition = evaluate_discussion(discussion, context.config);
    match disposition {
        DiscussionDisposition::Triage => {}
        DiscussionDisposition::Malformed => {
            warn!(
                discussion_id = %discussion.id,
                number = discussion.number,
                "skipping discussion with missing id or number"
            );
            report.discussions_skipped += 1;
            return;
        }
        other => {
            debug!(
                number = discussion.number,
                reason = other.as_str(),
                "skipping discussion"
            );
            report.discussions_skipped += 1;
            apply_follow_up(repository, context, discussion, other.follow_up(), report).await;
            return;
        }
    }

    let count = match repository.get_comment_count(discussion.number).await {
        Ok(count) => count,
        Err(error) => {
            warn!(number = discussion.number, %error, "unable to count comments");
            0
        }
    };
    if count == 0 {
        debug!(number = discussion.number, "discussion has no comments");
        return;
    }
    let comments = match repository.get_comments(discussion.number, count).await {
        Ok(comments) => comments,
        Err(error) => {
            warn!(number = discussion.number, %error, "unable to fetch comments");
            Vec::new()
        }
    };
    report.discussions_triaged += 1;

    let keyword = context.config.proposed_answer_keyword.as_str();
    for comment in &comments {
        if !comment.is_eligible() {
            warn!(
                number = discussion.number,
                comment_id = %comment.id,
                "skipping comment with missing id or body"
            );
            continue;
        }
        if !contains_keyword(comment, keyword) {
            continue;
        }
        match triage_comment(repository, context, &discussion.id, comment).await {
            Ok(action) => {
                report.record_action(action);
                if action.is_terminal() {
                    debug!(
                        number = discussion.number,
                        comment_id = %comment.id,
                        action = action.as_str(),
                        "discussion settled, skipping remaining comments"
                    );
                    break;
                }
            }
            Err(error) => {
                error!(
                    number = discussion.number,
                    comment_id = %comment.id,
                    %error,
                    "comment triage failed, skipping remaining comments"
                );
                report.record_failure(&error);
                break;
            }
        }
    }
}

async fn apply_follow_up<R>(
    repository: &R,
    context: &CommentTriageContext<'_>,
    discussion: &Discussion,
    follow_up: SkipFollowUp,
    report: &mut TriageRunReport,
) where
    R: DiscussionRepository + ?Sized,
{
    match follow_up {
        SkipFollowUp::None => {}
        SkipFollowUp::CloseAsResolved => {
            info!(number = discussion.number, "closing skipped discussion as resolved");
            match repository.close_as_resolved(&discussion.id).await {
                Ok(()) => report.follow_ups_applied += 1,
                Err(error) => {
                    error!(number = discussion.number, %error, "failed to close discussion");
                    report.record_failure(&error);
                }
            }
        }
        SkipFollowUp::Reopen => {
            info!(number = discussion.number, "reopening locked discussion");
            if let Err(error) = repository.reopen(&discussion.id).await {
                warn!(number = discussion.number, %error, "unable to reopen discussion");
                return;
            }
            report.follow_ups_applied += 1;
            if let Err(error) = repository
                .add_comment(
                    &discussion.id,
                    &context.config.open_discussion_instructions_text,
                )
                .await
            {
                error!(number = discussion.number, %error, "failed to post reopen notice");
                report.record_failure(&error);
            }
        }
    }
}
