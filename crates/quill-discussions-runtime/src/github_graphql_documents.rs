//! GraphQL documents sent to `POST {api_base}/graphql`.

pub(crate) const GET_LABEL_ID: &str = r#"
query GetLabelId($owner: String!, $name: String!, $labelName: String!) {
  repository(owner: $owner, name: $name) {
    label(name: $labelName) { id }
  }
}"#;

pub(crate) const GET_ANSWERABLE_CATEGORIES: &str = r#"
query GetAnswerableDiscussionCategories($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    discussionCategories(first: 100) {
      nodes { id isAnswerable }
    }
  }
}"#;

pub(crate) const GET_DISCUSSION_COUNT: &str = r#"
query GetDiscussionCount($owner: String!, $name: String!, $categoryId: ID!) {
  repository(owner: $owner, name: $name) {
    discussions(categoryId: $categoryId) { totalCount }
  }
}"#;

pub(crate) const GET_DISCUSSION_PAGE: &str = r#"
query GetDiscussionPage($owner: String!, $name: String!, $categoryId: ID!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    discussions(categoryId: $categoryId, first: $first, after: $after) {
      pageInfo { hasNextPage endCursor }
      nodes {
        id
        number
        bodyText
        locked
        closed
        answer { id }
        category { id }
      }
    }
  }
}"#;

pub(crate) const GET_COMMENT_COUNT: &str = r#"
query GetDiscussionCommentCount($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    discussion(number: $number) {
      comments { totalCount }
    }
  }
}"#;

pub(crate) const GET_COMMENTS: &str = r#"
query GetDiscussionComments($owner: String!, $name: String!, $number: Int!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    discussion(number: $number) {
      comments(first: $first, after: $after) {
        pageInfo { hasNextPage endCursor }
        nodes {
          id
          body
          bodyText
          updatedAt
          reactions(first: 100) {
            nodes { content }
          }
          replies(first: 100) {
            totalCount
            nodes {
              author { login }
              bodyText
            }
          }
        }
      }
    }
  }
}"#;

pub(crate) const ADD_LABELS: &str = r#"
mutation AddLabelToDiscussion($labelableId: ID!, $labelIds: [ID!]!) {
  addLabelsToLabelable(input: { labelableId: $labelableId, labelIds: $labelIds }) {
    clientMutationId
  }
}"#;

pub(crate) const CLOSE_DISCUSSION: &str = r#"
mutation CloseDiscussion($discussionId: ID!, $reason: DiscussionCloseReason!) {
  closeDiscussion(input: { discussionId: $discussionId, reason: $reason }) {
    discussion { id }
  }
}"#;

pub(crate) const REOPEN_DISCUSSION: &str = r#"
mutation ReopenDiscussion($discussionId: ID!) {
  reopenDiscussion(input: { discussionId: $discussionId }) {
    discussion { id }
  }
}"#;

pub(crate) const LOCK_DISCUSSION: &str = r#"
mutation LockDiscussion($discussionId: ID!) {
  lockLockable(input: { lockableId: $discussionId }) {
    clientMutationId
  }
}"#;

pub(crate) const ADD_DISCUSSION_COMMENT: &str = r#"
mutation AddDiscussionComment($discussionId: ID!, $body: String!, $replyToId: ID) {
  addDiscussionComment(input: { discussionId: $discussionId, body: $body, replyToId: $replyToId }) {
    comment { id }
  }
}"#;

pub(crate) const UPDATE_DISCUSSION_COMMENT: &str = r#"
mutation UpdateDiscussionComment($commentId: ID!, $body: String!) {
  updateDiscussionComment(input: { commentId: $commentId, body: $body }) {
    comment { id }
  }
}"#;

pub(crate) const MARK_COMMENT_AS_ANSWER: &str = r#"
mutation MarkDiscussionCommentAsAnswer($commentId: ID!) {
  markDiscussionCommentAsAnswer(input: { id: $commentId }) {
    discussion { id }
  }
}"#;
