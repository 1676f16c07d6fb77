//! Pure predicates over discussion comments used by the triage state machine.

use chrono::{DateTime, Utc};

use crate::discussion_types::{CommentReply, DiscussionComment, ReactionContent};

const MILLIS_PER_DAY: f64 = 1000.0 * 3600.0 * 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Sentiment bucket a reaction falls into.
pub enum ReactionSentiment {
    Positive,
    Negative,
    Neutral,
}

pub fn classify_reaction(content: ReactionContent) -> ReactionSentiment {
    match content {
        ReactionContent::ThumbsUp
        | ReactionContent::Heart
        | ReactionContent::Hooray
        | ReactionContent::Laugh
        | ReactionContent::Rocket => ReactionSentiment::Positive,
        ReactionContent::ThumbsDown | ReactionContent::Confused => ReactionSentiment::Negative,
        ReactionContent::Eyes | ReactionContent::Unknown => ReactionSentiment::Neutral,
    }
}

pub fn is_positive_reaction(content: ReactionContent) -> bool {
    classify_reaction(content) == ReactionSentiment::Positive
}

pub fn is_negative_reaction(content: ReactionContent) -> bool {
    classify_reaction(content) == ReactionSentiment::Negative
}

pub fn contains_positive_reaction(comment: &DiscussionComment) -> bool {
    comment
        .reactions
        .iter()
        .copied()
        .any(is_positive_reaction)
}

pub fn contains_negative_reaction(comment: &DiscussionComment) -> bool {
    comment
        .reactions
        .iter()
        .copied()
        .any(is_negative_reaction)
}

/// Case-sensitive substring match against the comment's plain body text.
pub fn contains_keyword(comment: &DiscussionComment, keyword: &str) -> bool {
    text_contains_keyword(&comment.body_text, keyword)
}

/// An empty keyword never matches.
pub fn text_contains_keyword(text: &str, keyword: &str) -> bool {
    !keyword.is_empty() && text.contains(keyword)
}

/// Fractional days between `now` and the comment's last update.
pub fn days_since_comment_at(comment: &DiscussionComment, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = now
        .signed_duration_since(comment.updated_at)
        .num_milliseconds();
    elapsed_ms as f64 / MILLIS_PER_DAY
}

pub fn days_since_comment(comment: &DiscussionComment) -> f64 {
    days_since_comment_at(comment, Utc::now())
}

/// Inclusive: a comment updated exactly `threshold_days` ago is stale.
pub fn exceeds_staleness_threshold_at(
    comment: &DiscussionComment,
    threshold_days: f64,
    now: DateTime<Utc>,
) -> bool {
    days_since_comment_at(comment, now) >= threshold_days
}

pub fn exceeds_staleness_threshold(comment: &DiscussionComment, threshold_days: f64) -> bool {
    exceeds_staleness_threshold_at(comment, threshold_days, Utc::now())
}

/// Replies beyond the fetched window (`reply_count` above the fetched replies) count as present.
pub fn has_replies(comment: &DiscussionComment) -> bool {
    comment.reply_count > comment.replies.len() as u64
        || comment
            .replies
            .iter()
            .any(|reply| !reply.body_text.trim().is_empty())
}

pub fn has_non_bot_reply(comment: &DiscussionComment, bot_login: &str) -> bool {
    comment
        .replies
        .iter()
        .any(|reply| !is_bot_reply(reply, bot_login))
}

pub fn has_non_instructions_reply(comment: &DiscussionComment, instructions_text: &str) -> bool {
    comment.replies.iter().any(|reply| {
        !reply.body_text.trim().is_empty() && !is_instructions_reply(reply, instructions_text)
    })
}

/// True when some reply is neither authored by the bot nor a copy of the instructions text.
pub fn has_engaged_reply(
    comment: &DiscussionComment,
    bot_login: &str,
    instructions_text: &str,
) -> bool {
    comment.replies.iter().any(|reply| {
        !reply.body_text.trim().is_empty()
            && !is_bot_reply(reply, bot_login)
            && !is_instructions_reply(reply, instructions_text)
    })
}

fn is_bot_reply(reply: &CommentReply, bot_login: &str) -> bool {
    let bot_login = normalize_login(bot_login);
    reply
        .author_login
        .as_deref()
        .map(normalize_login)
        .is_some_and(|login| login == bot_login)
}

// GitHub reports app authors as `name` in GraphQL and `name[bot]` in webhooks.
fn normalize_login(login: &str) -> &str {
    let trimmed = login.trim();
    trimmed.strip_suffix("[bot]").unwrap_or(trimmed)
}

fn is_instructions_reply(reply: &CommentReply, instructions_text: &str) -> bool {
    let instructions = instructions_text.trim();
    !instructions.is_empty() && reply.body_text.trim().contains(instructions)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{
        classify_reaction, contains_keyword, contains_negative_reaction,
        contains_positive_reaction, days_since_comment_at, exceeds_staleness_threshold_at,
        has_engaged_reply, has_non_bot_reply, has_non_instructions_reply, has_replies,
        is_negative_reaction, is_positive_reaction, ReactionSentiment,
    };
    use crate::discussion_types::{CommentReply, DiscussionComment, ReactionContent};

    fn sample_comment(body_text: &str) -> DiscussionComment {
        DiscussionComment {
            id: "DC_kwDO1".to_string(),
            body: body_text.to_string(),
            body_text: body_text.to_string(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            reactions: Vec::new(),
            replies: Vec::new(),
            reply_count: 0,
        }
    }

    fn reply(author: Option<&str>, body_text: &str) -> CommentReply {
        CommentReply {
            author_login: author.map(str::to_string),
            body_text: body_text.to_string(),
        }
    }

    #[test]
    fn unit_classify_reaction_covers_every_content_kind() {
        for positive in [
            ReactionContent::ThumbsUp,
            ReactionContent::Heart,
            ReactionContent::Hooray,
            ReactionContent::Laugh,
            ReactionContent::Rocket,
        ] {
            assert_eq!(classify_reaction(positive), ReactionSentiment::Positive);
            assert!(is_positive_reaction(positive));
            assert!(!is_negative_reaction(positive));
        }
        for negative in [ReactionContent::ThumbsDown, ReactionContent::Confused] {
            assert_eq!(classify_reaction(negative), ReactionSentiment::Negative);
        }
        assert_eq!(
            classify_reaction(ReactionContent::Eyes),
            ReactionSentiment::Neutral
        );
        assert_eq!(
            classify_reaction(ReactionContent::Unknown),
            ReactionSentiment::Neutral
        );
    }

    #[test]
    fn functional_reaction_presence_can_be_positive_and_negative_at_once() {
        let mut comment = sample_comment("answer");
        comment.reactions = vec![ReactionContent::Eyes];
        assert!(!contains_positive_reaction(&comment));
        assert!(!contains_negative_reaction(&comment));

        comment.reactions = vec![ReactionContent::Rocket, ReactionContent::Confused];
        assert!(contains_positive_reaction(&comment));
        assert!(contains_negative_reaction(&comment));
    }

    #[test]
    fn unit_contains_keyword_matches_any_prefix_and_suffix() {
        let keyword = "@github-actions proposed-answer";
        for (prefix, suffix) in [("", ""), ("see ", ""), ("", " thanks"), ("a\n", "\nb")] {
            let comment = sample_comment(&format!("{prefix}{keyword}{suffix}"));
            assert!(contains_keyword(&comment, keyword));
        }
    }

    #[test]
    fn regression_contains_keyword_is_case_sensitive_and_ignores_empty_keyword() {
        let comment = sample_comment("@GitHub-Actions Proposed-Answer");
        assert!(!contains_keyword(&comment, "@github-actions proposed-answer"));
        assert!(!contains_keyword(&comment, ""));
    }

    #[test]
    fn unit_days_since_comment_is_fractional_and_monotonic() {
        let comment = sample_comment("answer");
        let half_day_later = comment.updated_at + Duration::hours(12);
        assert!((days_since_comment_at(&comment, half_day_later) - 0.5).abs() < f64::EPSILON);

        let later = half_day_later + Duration::minutes(1);
        assert!(
            days_since_comment_at(&comment, later)
                >= days_since_comment_at(&comment, half_day_later)
        );
    }

    #[test]
    fn regression_staleness_threshold_is_boundary_inclusive() {
        let comment = sample_comment("answer");
        let exactly_seven = comment.updated_at + Duration::days(7);
        assert!(exceeds_staleness_threshold_at(&comment, 7.0, exactly_seven));
        assert!(!exceeds_staleness_threshold_at(
            &comment,
            7.0,
            exactly_seven - Duration::seconds(1)
        ));
    }

    #[test]
    fn unit_has_replies_ignores_blank_replies() {
        let mut comment = sample_comment("answer");
        assert!(!has_replies(&comment));
        comment.replies = vec![reply(Some("alice"), "  ")];
        assert!(!has_replies(&comment));
        comment.replies.push(reply(Some("alice"), "thanks"));
        assert!(has_replies(&comment));
    }

    #[test]
    fn regression_has_replies_counts_replies_beyond_fetched_window() {
        let mut comment = sample_comment("answer");
        comment.reply_count = 140;
        comment.replies = vec![reply(Some("alice"), " "); 100];
        assert!(has_replies(&comment));

        comment.reply_count = 100;
        assert!(!has_replies(&comment));
    }

    #[test]
    fn functional_non_bot_and_non_instruction_replies_are_detected_independently() {
        let instructions = "Hello! A team member has suggested the above comment";
        let mut comment = sample_comment("answer");
        comment.replies = vec![reply(Some("github-actions"), instructions)];
        assert!(!has_non_bot_reply(&comment, "github-actions"));
        assert!(!has_non_instructions_reply(&comment, instructions));
        assert!(!has_engaged_reply(&comment, "github-actions", instructions));

        comment.replies.push(reply(Some("alice"), "did not work for me"));
        assert!(has_non_bot_reply(&comment, "github-actions"));
        assert!(has_non_instructions_reply(&comment, instructions));
        assert!(has_engaged_reply(&comment, "github-actions", instructions));
    }

    #[test]
    fn regression_engaged_reply_treats_app_suffix_and_quoted_instructions_as_bot_output() {
        let instructions = "please upvote that comment";
        let mut comment = sample_comment("answer");
        comment.replies = vec![
            reply(Some("github-actions[bot]"), "Anything else"),
            reply(Some("maintainer"), "Reposting: please upvote that comment"),
        ];
        assert!(!has_engaged_reply(&comment, "github-actions", instructions));

        comment.replies.push(reply(None, "ghost author reply"));
        assert!(has_engaged_reply(&comment, "github-actions", instructions));
    }
}
