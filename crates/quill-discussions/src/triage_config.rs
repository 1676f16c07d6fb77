pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_GITHUB_BOT: &str = "github-actions";
pub const DEFAULT_DAYS_UNTIL_STALE: f64 = 7.0;
pub const DEFAULT_PROPOSED_ANSWER_KEYWORD: &str = "@github-actions proposed-answer";
pub const DEFAULT_ATTENTION_LABEL: &str = "attention";
pub const ANSWER_PREFIX: &str = "Answer: ";
pub const DEFAULT_STALE_RESPONSE_TEXT: &str =
    "Closing the discussion for staleness. Please open a new discussion if you have further concerns.";
pub const DEFAULT_INSTRUCTIONS_RESPONSE_TEXT: &str = concat!(
    "Hello! A team member has suggested the above comment as the likely answer to this discussion thread. ",
    "\n \n * If you agree, please upvote that comment, or click on Mark as answer. ",
    "I will automatically mark the discussion as answered with upvoted comment, next time I check. ",
    "\n \n * If this answer does not help you, please downvote the answer instead and let us know why it was not helpful. ",
    "I will add a label to this discussion to gain attention from the team."
);
pub const DEFAULT_OPEN_DISCUSSION_INSTRUCTIONS_TEXT: &str =
    "Hello! Reopening this discussion to make it searchable. ";

#[derive(Debug, Clone, PartialEq)]
/// Process-wide triage settings, built once at startup and passed by reference.
pub struct TriageConfig {
    pub page_size: usize,
    pub bot_login: String,
    pub days_until_stale: f64,
    pub proposed_answer_keyword: String,
    pub instructions_text: String,
    pub stale_response_text: String,
    pub open_discussion_instructions_text: String,
    pub close_locked_discussions: bool,
    pub close_answered_discussions: bool,
    /// Stale proposals are accepted as answers instead of being closed as outdated.
    pub close_stale_as_answered: bool,
    pub resolve_locked_discussions: bool,
    pub resolve_answered_discussions: bool,
    pub reopen_locked_discussions: bool,
    pub lock_accepted_discussions: bool,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            bot_login: DEFAULT_GITHUB_BOT.to_string(),
            days_until_stale: DEFAULT_DAYS_UNTIL_STALE,
            proposed_answer_keyword: DEFAULT_PROPOSED_ANSWER_KEYWORD.to_string(),
            instructions_text: DEFAULT_INSTRUCTIONS_RESPONSE_TEXT.to_string(),
            stale_response_text: DEFAULT_STALE_RESPONSE_TEXT.to_string(),
            open_discussion_instructions_text: DEFAULT_OPEN_DISCUSSION_INSTRUCTIONS_TEXT
                .to_string(),
            close_locked_discussions: true,
            close_answered_discussions: true,
            close_stale_as_answered: true,
            resolve_locked_discussions: false,
            resolve_answered_discussions: false,
            reopen_locked_discussions: false,
            lock_accepted_discussions: false,
        }
    }
}

/// Replace the first keyword occurrence with the accepted-answer prefix.
pub fn render_accepted_answer_body(body: &str, keyword: &str) -> String {
    if keyword.is_empty() {
        return body.to_string();
    }
    body.replacen(keyword, ANSWER_PREFIX, 1)
}

#[cfg(test)]
mod tests {
    use super::{render_accepted_answer_body, TriageConfig, DEFAULT_PROPOSED_ANSWER_KEYWORD};

    #[test]
    fn unit_default_config_matches_documented_defaults() {
        let config = TriageConfig::default();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.bot_login, "github-actions");
        assert_eq!(config.days_until_stale, 7.0);
        assert_eq!(config.proposed_answer_keyword, DEFAULT_PROPOSED_ANSWER_KEYWORD);
        assert!(config.close_locked_discussions);
        assert!(config.close_answered_discussions);
        assert!(config.close_stale_as_answered);
        assert!(!config.resolve_locked_discussions);
        assert!(!config.reopen_locked_discussions);
    }

    #[test]
    fn functional_render_accepted_answer_body_replaces_only_first_keyword() {
        let keyword = DEFAULT_PROPOSED_ANSWER_KEYWORD;
        let body = format!("{keyword} use `--locked`. cc {keyword}");
        assert_eq!(
            render_accepted_answer_body(&body, keyword),
            format!("Answer:  use `--locked`. cc {keyword}")
        );
        assert_eq!(render_accepted_answer_body("plain", ""), "plain");
    }
}
