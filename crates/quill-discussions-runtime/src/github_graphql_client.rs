use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_discussions::discussion_repository::{
    DiscussionOperation, DiscussionRepository, RepositoryError, RepositoryResult,
};
use quill_discussions::discussion_types::{
    CommentReply, Discussion, DiscussionCategory, DiscussionComment, DiscussionPage,
    ReactionContent,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::github_graphql_documents::{
    ADD_DISCUSSION_COMMENT, ADD_LABELS, CLOSE_DISCUSSION, GET_ANSWERABLE_CATEGORIES,
    GET_COMMENTS, GET_COMMENT_COUNT, GET_DISCUSSION_COUNT, GET_DISCUSSION_PAGE, GET_LABEL_ID,
    LOCK_DISCUSSION, MARK_COMMENT_AS_ANSWER, REOPEN_DISCUSSION, UPDATE_DISCUSSION_COMMENT,
};
use crate::github_transport_helpers::{
    is_retryable_github_status, is_retryable_transport_error, rate_limit_wait, retry_delay,
    truncate_for_error,
};

const GITHUB_MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| anyhow!("invalid --github-repo '{raw}', expected owner/repo"))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("invalid --github-repo '{raw}', expected owner/repo");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryData<T> {
    repository: Option<T>,
}

#[derive(Debug, Deserialize)]
struct IdNode {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginNode {
    login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Nodes<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
struct LabelRepository {
    label: Option<IdNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRepository {
    discussion_categories: Nodes<DiscussionCategory>,
}

#[derive(Debug, Deserialize)]
struct DiscussionCountRepository {
    discussions: TotalCount,
}

#[derive(Debug, Deserialize)]
struct DiscussionPageRepository {
    discussions: DiscussionConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionConnection {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<Option<DiscussionNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscussionNode {
    id: Option<String>,
    number: Option<u64>,
    #[serde(default)]
    body_text: Option<String>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    closed: bool,
    answer: Option<IdNode>,
    category: Option<IdNode>,
}

impl DiscussionNode {
    fn into_discussion(self) -> Discussion {
        Discussion {
            id: self.id.unwrap_or_default(),
            number: self.number.unwrap_or(0),
            body_text: self.body_text.unwrap_or_default(),
            locked: self.locked,
            closed: self.closed,
            answer_id: self.answer.and_then(|answer| answer.id),
            category_id: self
                .category
                .and_then(|category| category.id)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DiscussionHolder<T> {
    discussion: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CommentCountDiscussion {
    comments: TotalCount,
}

#[derive(Debug, Deserialize)]
struct CommentsDiscussion {
    comments: CommentConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentConnection {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<Option<CommentNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    id: Option<String>,
    body: Option<String>,
    body_text: Option<String>,
    updated_at: DateTime<Utc>,
    reactions: Nodes<ReactionNode>,
    replies: ReplyConnection,
}

#[derive(Debug, Deserialize)]
struct ReactionNode {
    content: ReactionContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyConnection {
    total_count: u64,
    #[serde(default)]
    nodes: Vec<Option<ReplyNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyNode {
    author: Option<LoginNode>,
    body_text: Option<String>,
}

impl CommentNode {
    fn into_comment(self) -> DiscussionComment {
        DiscussionComment {
            id: self.id.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            body_text: self.body_text.unwrap_or_default(),
            updated_at: self.updated_at,
            reactions: self
                .reactions
                .nodes
                .into_iter()
                .flatten()
                .map(|reaction| reaction.content)
                .collect(),
            replies: self
                .replies
                .nodes
                .into_iter()
                .flatten()
                .map(|reply| CommentReply {
                    author_login: reply.author.map(|author| author.login),
                    body_text: reply.body_text.unwrap_or_default(),
                })
                .collect(),
            reply_count: self.replies.total_count,
        }
    }
}

#[derive(Clone)]
/// `DiscussionRepository` backed by the GitHub GraphQL API.
pub struct GithubGraphqlClient {
    http: reqwest::Client,
    graphql_url: String,
    repo: RepoRef,
    retry_max_attempts: usize,
    retry_base_delay_ms: u64,
}

impl GithubGraphqlClient {
    pub fn new(
        api_base: String,
        token: String,
        repo: RepoRef,
        request_timeout_ms: u64,
        retry_max_attempts: usize,
        retry_base_delay_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("quill-discussions-bot"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("invalid github authorization header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create github graphql client")?;
        Ok(Self {
            http: client,
            graphql_url: format!("{}/graphql", api_base.trim_end_matches('/')),
            repo,
            retry_max_attempts: retry_max_attempts.max(1),
            retry_base_delay_ms: retry_base_delay_ms.max(1),
        })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    fn repo_variables(&self) -> Value {
        json!({
            "owner": self.repo.owner,
            "name": self.repo.name,
        })
    }

    fn repo_variables_with(&self, extra: Value) -> Value {
        let mut variables = self.repo_variables();
        if let (Some(base), Value::Object(extra)) = (variables.as_object_mut(), extra) {
            base.extend(extra);
        }
        variables
    }

    async fn query_repository<T>(&self, operation: &str, query: &str, variables: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let data: RepositoryData<T> = self.execute(operation, query, variables).await?;
        data.repository.ok_or_else(|| {
            anyhow!(
                "couldn't find repository {} while attempting to {operation}",
                self.repo.as_slug()
            )
        })
    }

    async fn execute<T>(&self, operation: &str, query: &str, variables: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let payload = GraphqlRequest { query, variables };
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let response = self
                .http
                .post(&self.graphql_url)
                .header("x-quill-retry-attempt", attempt.saturating_sub(1).to_string())
                .json(&payload)
                .send()
                .await;
            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let envelope = response
                            .json::<GraphqlEnvelope<T>>()
                            .await
                            .with_context(|| format!("failed to decode github {operation}"))?;
                        if !envelope.errors.is_empty() {
                            let messages = envelope
                                .errors
                                .iter()
                                .map(|error| error.message.as_str())
                                .collect::<Vec<_>>()
                                .join("; ");
                            bail!(
                                "github graphql {operation} returned errors: {}",
                                truncate_for_error(&messages, 800)
                            );
                        }
                        return envelope
                            .data
                            .ok_or_else(|| anyhow!("github graphql {operation} returned no data"));
                    }

                    let wait = rate_limit_wait(response.headers(), Utc::now().timestamp());
                    let body = response.text().await.unwrap_or_default();
                    if attempt < self.retry_max_attempts
                        && is_retryable_github_status(status.as_u16(), wait.is_some())
                    {
                        debug!(
                            operation,
                            attempt,
                            status = status.as_u16(),
                            "retrying github graphql request"
                        );
                        tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, wait))
                        .await;
                        continue;
                    }

                    bail!(
                        "github graphql {operation} failed with status {}: {}",
                        status.as_u16(),
                        truncate_for_error(&body, 800)
                    );
                }
                Err(error) => {
                    if attempt < self.retry_max_attempts && is_retryable_transport_error(&error) {
                        tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, None))
                            .await;
                        continue;
                    }
                    return Err(error)
                        .with_context(|| format!("github graphql {operation} request failed"));
                }
            }
        }
    }

    async fn mutate(
        &self,
        operation: DiscussionOperation,
        target: &str,
        mutation: &str,
        variables: Value,
    ) -> RepositoryResult<()> {
        self.execute::<Value>(operation.as_str(), mutation, variables)
            .await
            .map(|_| ())
            .map_err(|error| repository_error(operation, target, error))
    }
}

fn repository_error(
    operation: DiscussionOperation,
    target: &str,
    error: anyhow::Error,
) -> RepositoryError {
    RepositoryError::for_operation(operation, target, format!("{error:#}"))
}

#[async_trait]
impl DiscussionRepository for GithubGraphqlClient {
    async fn resolve_label_id(&self, label_name: &str) -> RepositoryResult<Option<String>> {
        let operation = DiscussionOperation::ResolveLabel;
        let repository: LabelRepository = self
            .query_repository(
                operation.as_str(),
                GET_LABEL_ID,
                self.repo_variables_with(json!({ "labelName": label_name })),
            )
            .await
            .map_err(|error| repository_error(operation, label_name, error))?;
        Ok(repository.label.and_then(|label| label.id))
    }

    async fn list_answerable_category_ids(&self) -> RepositoryResult<Vec<String>> {
        let operation = DiscussionOperation::ListAnswerableCategories;
        let repository: CategoryRepository = self
            .query_repository(
                operation.as_str(),
                GET_ANSWERABLE_CATEGORIES,
                self.repo_variables(),
            )
            .await
            .map_err(|error| repository_error(operation, &self.repo.as_slug(), error))?;
        Ok(repository
            .discussion_categories
            .nodes
            .into_iter()
            .flatten()
            .filter(|category| category.is_answerable)
            .map(|category| category.id)
            .collect())
    }

    async fn get_discussion_count(&self, category_id: &str) -> RepositoryResult<u64> {
        let operation = DiscussionOperation::CountDiscussions;
        let repository: DiscussionCountRepository = self
            .query_repository(
                operation.as_str(),
                GET_DISCUSSION_COUNT,
                self.repo_variables_with(json!({ "categoryId": category_id })),
            )
            .await
            .map_err(|error| repository_error(operation, category_id, error))?;
        Ok(repository.discussions.total_count)
    }

    async fn get_discussion_page(
        &self,
        category_id: &str,
        page_size: usize,
        after: Option<&str>,
    ) -> RepositoryResult<DiscussionPage> {
        let operation = DiscussionOperation::ListDiscussions;
        let first = (page_size as u64).clamp(1, GITHUB_MAX_PAGE_SIZE);
        let repository: DiscussionPageRepository = self
            .query_repository(
                operation.as_str(),
                GET_DISCUSSION_PAGE,
                self.repo_variables_with(json!({
                    "categoryId": category_id,
                    "first": first,
                    "after": after,
                })),
            )
            .await
            .map_err(|error| repository_error(operation, category_id, error))?;
        let connection = repository.discussions;
        Ok(DiscussionPage {
            discussions: connection
                .nodes
                .into_iter()
                .map(|node| node.map(DiscussionNode::into_discussion).unwrap_or_default())
                .collect(),
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        })
    }

    async fn get_comment_count(&self, discussion_number: u64) -> RepositoryResult<u64> {
        let operation = DiscussionOperation::CountComments;
        let target = format!("#{discussion_number}");
        let repository: DiscussionHolder<CommentCountDiscussion> = self
            .query_repository(
                operation.as_str(),
                GET_COMMENT_COUNT,
                self.repo_variables_with(json!({ "number": discussion_number })),
            )
            .await
            .map_err(|error| repository_error(operation, &target, error))?;
        Ok(repository
            .discussion
            .map(|discussion| discussion.comments.total_count)
            .unwrap_or(0))
    }

    async fn get_comments(
        &self,
        discussion_number: u64,
        count: u64,
    ) -> RepositoryResult<Vec<DiscussionComment>> {
        let operation = DiscussionOperation::ListComments;
        let target = format!("#{discussion_number}");
        let mut comments = Vec::new();
        let mut after: Option<String> = None;
        while (comments.len() as u64) < count {
            let remaining = count.saturating_sub(comments.len() as u64);
            let repository: DiscussionHolder<CommentsDiscussion> = self
                .query_repository(
                    operation.as_str(),
                    GET_COMMENTS,
                    self.repo_variables_with(json!({
                        "number": discussion_number,
                        "first": remaining.min(GITHUB_MAX_PAGE_SIZE),
                        "after": after,
                    })),
                )
                .await
                .map_err(|error| repository_error(operation, &target, error))?;
            let Some(discussion) = repository.discussion else {
                break;
            };
            let connection = discussion.comments;
            let fetched = connection.nodes.len();
            comments.extend(
                connection
                    .nodes
                    .into_iter()
                    .flatten()
                    .map(CommentNode::into_comment),
            );
            match connection.page_info.end_cursor {
                Some(cursor) if connection.page_info.has_next_page && fetched > 0 => {
                    after = Some(cursor);
                }
                _ => break,
            }
        }
        Ok(comments)
    }

    async fn add_label(&self, discussion_id: &str, label_id: &str) -> RepositoryResult<()> {
        self.mutate(
            DiscussionOperation::AddLabel,
            discussion_id,
            ADD_LABELS,
            json!({ "labelableId": discussion_id, "labelIds": [label_id] }),
        )
        .await
    }

    async fn close_as_resolved(&self, discussion_id: &str) -> RepositoryResult<()> {
        self.mutate(
            DiscussionOperation::CloseAsResolved,
            discussion_id,
            CLOSE_DISCUSSION,
            json!({ "discussionId": discussion_id, "reason": "RESOLVED" }),
        )
        .await
    }

    async fn close_as_outdated(&self, discussion_id: &str) -> RepositoryResult<()> {
        self.mutate(
            DiscussionOperation::CloseAsOutdated,
            discussion_id,
            CLOSE_DISCUSSION,
            json!({ "discussionId": discussion_id, "reason": "OUTDATED" }),
        )
        .await
    }

    async fn reopen(&self, discussion_id: &str) -> RepositoryResult<()> {
        self.mutate(
            DiscussionOperation::Reopen,
            discussion_id,
            REOPEN_DISCUSSION,
            json!({ "discussionId": discussion_id }),
        )
        .await
    }

    async fn lock(&self, discussion_id: &str) -> RepositoryResult<()> {
        self.mutate(
            DiscussionOperation::Lock,
            discussion_id,
            LOCK_DISCUSSION,
            json!({ "discussionId": discussion_id }),
        )
        .await
    }

    async fn add_comment(&self, discussion_id: &str, body: &str) -> RepositoryResult<()> {
        self.mutate(
            DiscussionOperation::AddComment,
            discussion_id,
            ADD_DISCUSSION_COMMENT,
            json!({ "discussionId": discussion_id, "body": body, "replyToId": null }),
        )
        .await
    }

    async fn add_reply(
        &self,
        body: &str,
        discussion_id: &str,
        reply_to_comment_id: &str,
    ) -> RepositoryResult<()> {
        self.mutate(
            DiscussionOperation::AddReply,
            reply_to_comment_id,
            ADD_DISCUSSION_COMMENT,
            json!({
                "discussionId": discussion_id,
                "body": body,
                "replyToId": reply_to_comment_id,
            }),
        )
        .await
    }

    async fn update_comment(&self, comment_id: &str, body: &str) -> RepositoryResult<()> {
        self.mutate(
            DiscussionOperation::UpdateComment,
            comment_id,
            UPDATE_DISCUSSION_COMMENT,
            json!({ "commentId": comment_id, "body": body }),
        )
        .await
    }

    async fn mark_as_answer(&self, comment_id: &str) -> RepositoryResult<()> {
        self.mutate(
            DiscussionOperation::MarkAsAnswer,
            comment_id,
            MARK_COMMENT_AS_ANSWER,
            json!({ "commentId": comment_id }),
        )
        .await
    }
}
