//! Runtime for the Quill discussions bot.
//!
//! Wires the shared triage engine to the GitHub GraphQL API: the
//! `GithubGraphqlClient` repository, workflow trigger loading, and the
//! sweep/new-comment dispatcher.

pub mod discussion_triage_runtime;
pub mod github_graphql_client;
mod github_graphql_documents;
mod github_transport_helpers;
pub mod trigger_event;

pub use discussion_triage_runtime::{
    dispatch_trigger, process_discussions, run_discussion_triage,
    run_discussion_triage_with_repository, DiscussionTriageRuntimeConfig, TriageRunReport,
};
pub use github_graphql_client::{GithubGraphqlClient, RepoRef};
pub use trigger_event::{NewCommentEvent, TriggerEvent};
