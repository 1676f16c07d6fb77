//! Shared triage engine for the Quill discussions bot.
//! This crate provides the discussion data model, reaction/reply classifiers,
//! the discussion filter, and the comment triage state machine that drives
//! mutations through a `DiscussionRepository`.

pub mod comment_triage;
pub mod discussion_classifiers;
pub mod discussion_filter;
pub mod discussion_repository;
pub mod discussion_types;
#[cfg(any(test, feature = "test-support"))]
pub mod in_memory_repository;
pub mod triage_config;
