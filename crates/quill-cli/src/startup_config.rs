use anyhow::{anyhow, bail, Context, Result};
use quill_discussions::triage_config::TriageConfig;
use quill_discussions_runtime::{
    run_discussion_triage, DiscussionTriageRuntimeConfig, RepoRef, TriggerEvent,
};
use tracing::info;

use crate::Cli;

pub fn build_triage_config(cli: &Cli) -> TriageConfig {
    TriageConfig {
        page_size: cli.page_size.max(1),
        bot_login: cli.github_bot.trim().to_string(),
        days_until_stale: cli.days_until_stale,
        proposed_answer_keyword: cli.proposed_answer_keyword.clone(),
        instructions_text: cli.instructions_response_text.clone(),
        stale_response_text: cli.stale_response_text.clone(),
        open_discussion_instructions_text: cli.open_discussion_instructions_text.clone(),
        close_locked_discussions: cli.close_locked_discussions,
        close_answered_discussions: cli.close_answered_discussions,
        close_stale_as_answered: cli.close_stale_as_answered,
        resolve_locked_discussions: cli.resolve_locked_discussions,
        resolve_answered_discussions: cli.resolve_answered_discussions,
        reopen_locked_discussions: cli.reopen_locked_discussions,
        lock_accepted_discussions: cli.lock_accepted_discussions,
    }
}

/// Validates required inputs and loads the trigger payload.
pub fn build_runtime_config(cli: &Cli) -> Result<DiscussionTriageRuntimeConfig> {
    let repo_slug = cli
        .github_repo
        .as_deref()
        .map(str::trim)
        .filter(|repo| !repo.is_empty())
        .ok_or_else(|| anyhow!("--github-repo (or GITHUB_REPOSITORY) is required"))?;
    let repo = RepoRef::parse(repo_slug)?;
    let token = cli
        .github_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| anyhow!("--github-token (or GITHUB_TOKEN) is required"))?;
    let attention_label = cli.attention_label.trim();
    if attention_label.is_empty() {
        bail!("--attention-label must not be empty");
    }
    let trigger = TriggerEvent::load(cli.event_name.as_deref(), cli.event_path.as_deref())
        .context("failed to load workflow trigger")?;

    Ok(DiscussionTriageRuntimeConfig {
        triage: build_triage_config(cli),
        repo_slug: repo.as_slug(),
        api_base: cli.github_api_base.clone(),
        token: token.to_string(),
        attention_label: attention_label.to_string(),
        request_timeout_ms: cli.request_timeout_ms.max(1),
        retry_max_attempts: cli.retry_max_attempts.max(1),
        retry_base_delay_ms: cli.retry_base_delay_ms.max(1),
        trigger,
    })
}

pub async fn run_cli(cli: Cli) -> Result<()> {
    let config = build_runtime_config(&cli)?;
    info!(
        repo = %config.repo_slug,
        trigger = config.trigger.as_str(),
        "starting quill"
    );
    run_discussion_triage(config).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use quill_discussions_runtime::TriggerEvent;
    use tempfile::tempdir;

    use super::{build_runtime_config, build_triage_config};
    use crate::Cli;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["quill"];
        argv.extend_from_slice(args);
        let mut cli = Cli::try_parse_from(argv).expect("parse");
        // Workflow runners export these; keep tests independent of the host.
        if !args.contains(&"--event-name") {
            cli.event_name = None;
            cli.event_path = None;
        }
        cli
    }

    #[test]
    fn unit_build_triage_config_maps_every_flag() {
        let cli = parse(&[
            "--github-bot",
            " helper-bot ",
            "--proposed-answer-keyword",
            "/answer",
            "--close-answered-discussions=false",
            "--resolve-locked-discussions=true",
            "--reopen-locked-discussions",
            "--stale-response-text",
            "closing",
        ]);
        let config = build_triage_config(&cli);
        assert_eq!(config.bot_login, "helper-bot");
        assert_eq!(config.proposed_answer_keyword, "/answer");
        assert!(!config.close_answered_discussions);
        assert!(config.resolve_locked_discussions);
        assert!(config.reopen_locked_discussions);
        assert_eq!(config.stale_response_text, "closing");
    }

    #[test]
    fn functional_build_runtime_config_requires_repo_and_token() {
        let mut cli = parse(&["--github-repo", "octo-org/widgets", "--github-token", "t0k"]);
        let config = build_runtime_config(&cli).expect("config");
        assert_eq!(config.repo_slug, "octo-org/widgets");
        assert_eq!(config.token, "t0k");
        assert_eq!(config.trigger, TriggerEvent::Sweep);

        cli.github_token = Some("   ".to_string());
        let error = build_runtime_config(&cli).expect_err("missing token");
        assert!(error.to_string().contains("--github-token"));

        cli.github_token = Some("t0k".to_string());
        cli.github_repo = None;
        let error = build_runtime_config(&cli).expect_err("missing repo");
        assert!(error.to_string().contains("--github-repo"));

        cli.github_repo = Some("widgets".to_string());
        assert!(build_runtime_config(&cli).is_err());
    }

    #[test]
    fn integration_build_runtime_config_loads_new_comment_trigger() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("event.json");
        std::fs::write(
            &path,
            r#"{
                "action": "created",
                "comment": { "node_id": "DC_9", "body": "hi", "parent_id": null },
                "discussion": { "node_id": "D_9" }
            }"#,
        )
        .expect("write");
        let path_arg = path.display().to_string();
        let cli = parse(&[
            "--github-repo",
            "octo-org/widgets",
            "--github-token",
            "t0k",
            "--event-name",
            "discussion_comment",
            "--event-path",
            path_arg.as_str(),
        ]);
        let config = build_runtime_config(&cli).expect("config");
        let TriggerEvent::NewComment(event) = config.trigger else {
            panic!("expected new comment trigger");
        };
        assert_eq!(event.discussion_id, "D_9");
        assert_eq!(event.comment_id, "DC_9");
    }
}
