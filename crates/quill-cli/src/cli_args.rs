use std::path::PathBuf;

use clap::{ArgAction, Parser};
use quill_discussions::triage_config::{
    DEFAULT_ATTENTION_LABEL, DEFAULT_GITHUB_BOT, DEFAULT_INSTRUCTIONS_RESPONSE_TEXT,
    DEFAULT_OPEN_DISCUSSION_INSTRUCTIONS_TEXT, DEFAULT_PROPOSED_ANSWER_KEYWORD,
    DEFAULT_STALE_RESPONSE_TEXT,
};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_f64(value: &str) -> Result<f64, String> {
    let parsed = value
        .parse::<f64>()
        .map_err(|error| format!("failed to parse float: {error}"))?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return Err("value must be a finite number greater than 0".to_string());
    }
    Ok(parsed)
}

/// Workflow inputs arrive as free text; only `false` (any case) turns a toggle off.
pub(crate) fn parse_lenient_bool(value: &str) -> Result<bool, String> {
    Ok(!value.trim().eq_ignore_ascii_case("false"))
}

#[derive(Debug, Parser)]
#[command(
    name = "quill",
    about = "Triage proposed answers in GitHub Discussions",
    version
)]
pub struct Cli {
    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token used for GraphQL API access"
    )]
    pub github_token: Option<String>,

    #[arg(
        long = "github-repo",
        env = "GITHUB_REPOSITORY",
        help = "GitHub repository in owner/repo format"
    )]
    pub github_repo: Option<String>,

    #[arg(
        long = "github-api-base",
        env = "QUILL_GITHUB_API_BASE",
        default_value = "https://api.github.com",
        help = "GitHub API base URL; GraphQL requests go to <base>/graphql"
    )]
    pub github_api_base: String,

    #[arg(
        long = "page-size",
        env = "QUILL_PAGE_SIZE",
        default_value_t = 50,
        value_parser = parse_positive_usize,
        help = "Discussions requested per page (GitHub caps pages at 100)"
    )]
    pub page_size: usize,

    #[arg(
        long = "github-bot",
        env = "QUILL_GITHUB_BOT",
        default_value = DEFAULT_GITHUB_BOT,
        help = "Login of the bot account whose replies do not count as engagement"
    )]
    pub github_bot: String,

    #[arg(
        long = "days-until-stale",
        env = "QUILL_DAYS_UNTIL_STALE",
        default_value_t = 7.0,
        value_parser = parse_positive_f64,
        help = "Days without activity after which a proposed answer is stale"
    )]
    pub days_until_stale: f64,

    #[arg(
        long = "proposed-answer-keyword",
        env = "QUILL_PROPOSED_ANSWER_KEYWORD",
        default_value = DEFAULT_PROPOSED_ANSWER_KEYWORD,
        help = "Case-sensitive marker identifying a proposed answer comment"
    )]
    pub proposed_answer_keyword: String,

    #[arg(
        long = "attention-label",
        env = "QUILL_ATTENTION_LABEL",
        default_value = DEFAULT_ATTENTION_LABEL,
        help = "Existing repository label applied when a proposal needs maintainer attention"
    )]
    pub attention_label: String,

    #[arg(
        long = "close-locked-discussions",
        env = "QUILL_CLOSE_LOCKED_DISCUSSIONS",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_lenient_bool,
        help = "Skip locked discussions instead of triaging their comments"
    )]
    pub close_locked_discussions: bool,

    #[arg(
        long = "close-answered-discussions",
        env = "QUILL_CLOSE_ANSWERED_DISCUSSIONS",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_lenient_bool,
        help = "Skip discussions that already have an accepted answer"
    )]
    pub close_answered_discussions: bool,

    #[arg(
        long = "close-stale-as-answered",
        env = "QUILL_CLOSE_STALE_AS_ANSWERED",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_lenient_bool,
        help = "Accept stale proposals as answers; when false, close them as outdated"
    )]
    pub close_stale_as_answered: bool,

    #[arg(
        long = "resolve-locked-discussions",
        env = "QUILL_RESOLVE_LOCKED_DISCUSSIONS",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_lenient_bool,
        help = "Close open locked discussions as resolved"
    )]
    pub resolve_locked_discussions: bool,

    #[arg(
        long = "resolve-answered-discussions",
        env = "QUILL_RESOLVE_ANSWERED_DISCUSSIONS",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_lenient_bool,
        help = "Close open answered discussions as resolved"
    )]
    pub resolve_answered_discussions: bool,

    #[arg(
        long = "reopen-locked-discussions",
        env = "QUILL_REOPEN_LOCKED_DISCUSSIONS",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_lenient_bool,
        help = "Reopen closed locked discussions so they stay searchable"
    )]
    pub reopen_locked_discussions: bool,

    #[arg(
        long = "lock-accepted-discussions",
        env = "QUILL_LOCK_ACCEPTED_DISCUSSIONS",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_lenient_bool,
        help = "Lock discussions after accepting a positively reacted answer"
    )]
    pub lock_accepted_discussions: bool,

    #[arg(
        long = "stale-response-text",
        env = "QUILL_STALE_RESPONSE_TEXT",
        default_value = DEFAULT_STALE_RESPONSE_TEXT,
        help = "Comment posted before closing a stale discussion as outdated"
    )]
    pub stale_response_text: String,

    #[arg(
        long = "instructions-response-text",
        env = "QUILL_INSTRUCTIONS_RESPONSE_TEXT",
        default_value = DEFAULT_INSTRUCTIONS_RESPONSE_TEXT,
        help = "Reply posted under a proposed answer that has no replies"
    )]
    pub instructions_response_text: String,

    #[arg(
        long = "open-discussion-instructions-text",
        env = "QUILL_OPEN_DISCUSSION_INSTRUCTIONS_TEXT",
        default_value = DEFAULT_OPEN_DISCUSSION_INSTRUCTIONS_TEXT,
        help = "Comment posted after reopening a locked discussion"
    )]
    pub open_discussion_instructions_text: String,

    #[arg(
        long = "event-name",
        env = "GITHUB_EVENT_NAME",
        help = "Workflow event that triggered this run; discussion_comment enables new-comment handling"
    )]
    pub event_name: Option<String>,

    #[arg(
        long = "event-path",
        env = "GITHUB_EVENT_PATH",
        help = "Path to the workflow event JSON payload"
    )]
    pub event_path: Option<PathBuf>,

    #[arg(
        long = "request-timeout-ms",
        env = "QUILL_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Timeout for each GitHub API request in milliseconds"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "QUILL_RETRY_MAX_ATTEMPTS",
        default_value_t = 3,
        value_parser = parse_positive_usize,
        help = "Maximum attempts for retryable GitHub API failures"
    )]
    pub retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "QUILL_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        value_parser = parse_positive_u64,
        help = "Base backoff delay in milliseconds between retries"
    )]
    pub retry_base_delay_ms: u64,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{parse_lenient_bool, Cli};

    #[test]
    fn unit_parse_lenient_bool_only_disables_on_false() {
        for raw in ["false", "FALSE", " False "] {
            assert_eq!(parse_lenient_bool(raw), Ok(false), "{raw}");
        }
        for raw in ["true", "no", "0", "", "yes"] {
            assert_eq!(parse_lenient_bool(raw), Ok(true), "{raw}");
        }
    }

    #[test]
    fn functional_cli_parses_toggles_and_numeric_flags() {
        let cli = Cli::try_parse_from([
            "quill",
            "--github-repo",
            "octo-org/widgets",
            "--page-size",
            "25",
            "--days-until-stale",
            "2.5",
            "--close-locked-discussions=FALSE",
            "--lock-accepted-discussions",
            "--close-stale-as-answered=nope",
        ])
        .expect("parse");
        assert_eq!(cli.github_repo.as_deref(), Some("octo-org/widgets"));
        assert_eq!(cli.page_size, 25);
        assert_eq!(cli.days_until_stale, 2.5);
        assert!(!cli.close_locked_discussions);
        assert!(cli.lock_accepted_discussions);
        assert!(cli.close_stale_as_answered);
    }

    #[test]
    fn regression_cli_rejects_non_positive_numbers() {
        for args in [
            ["quill", "--page-size", "0"],
            ["quill", "--days-until-stale", "-1"],
            ["quill", "--retry-max-attempts", "0"],
            ["quill", "--request-timeout-ms", "abc"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{args:?}");
        }
    }
}
