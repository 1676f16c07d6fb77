//! Command-line surface for the Quill discussions bot.
//!
//! Parses flags (with GitHub Actions environment fallbacks) into the runtime
//! configuration consumed by `quill-discussions-runtime`.

pub mod cli_args;
pub mod startup_config;

pub use cli_args::Cli;
pub use startup_config::{build_runtime_config, build_triage_config, run_cli};
