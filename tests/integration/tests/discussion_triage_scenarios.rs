use chrono::{DateTime, Duration, TimeZone, Utc};
use quill_discussions::discussion_types::{
    CommentReply, Discussion, DiscussionComment, ReactionContent,
};
use quill_discussions::in_memory_repository::{InMemoryDiscussionRepository, RecordedCall};
use quill_discussions::triage_config::{TriageConfig, DEFAULT_PROPOSED_ANSWER_KEYWORD};
use quill_discussions_runtime::{run_discussion_triage_with_repository, TriggerEvent};

const CATEGORY: &str = "DIC_kwDOqa";
const LABEL_ID: &str = "LA_kwDOattention";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap()
}

fn discussion(id: &str, number: u64) -> Discussion {
    Discussion {
        id: id.to_string(),
        number,
        body_text: "cargo build hangs on the CI runner".to_string(),
        locked: false,
        closed: false,
        answer_id: None,
        category_id: CATEGORY.to_string(),
    }
}

fn proposed_comment(id: &str, age: Duration) -> DiscussionComment {
    let text = format!("{DEFAULT_PROPOSED_ANSWER_KEYWORD} set CARGO_NET_GIT_FETCH_WITH_CLI=true");
    DiscussionComment {
        id: id.to_string(),
        body: text.clone(),
        body_text: text,
        updated_at: now() - age,
        reactions: Vec::new(),
        replies: Vec::new(),
        reply_count: 0,
    }
}

fn seeded_repository() -> InMemoryDiscussionRepository {
    InMemoryDiscussionRepository::new()
        .with_label("attention", LABEL_ID)
        .with_category(CATEGORY, true)
}

async fn sweep(
    repository: &InMemoryDiscussionRepository,
    config: &TriageConfig,
) -> anyhow::Result<()> {
    run_discussion_triage_with_repository(
        repository,
        config,
        "attention",
        &TriggerEvent::Sweep,
        now(),
    )
    .await
    .map(|_| ())
}

fn has_label_or_reply(calls: &[RecordedCall]) -> bool {
    calls.iter().any(|call| {
        matches!(
            call,
            RecordedCall::AddLabel { .. } | RecordedCall::AddReply { .. }
        )
    })
}

#[tokio::test]
async fn integration_thumbs_up_proposal_is_accepted_and_resolved_once() {
    let mut comment = proposed_comment("C1", Duration::hours(3));
    comment.reactions = vec![ReactionContent::ThumbsUp];
    let repository = seeded_repository()
        .with_discussion(discussion("D1", 1))
        .with_comments(1, vec![comment]);

    sweep(&repository, &TriageConfig::default())
        .await
        .expect("sweep");

    let calls = repository.calls();
    assert_eq!(
        calls,
        vec![
            RecordedCall::UpdateComment {
                comment_id: "C1".to_string(),
                body: "Answer:  set CARGO_NET_GIT_FETCH_WITH_CLI=true".to_string(),
            },
            RecordedCall::MarkAsAnswer {
                comment_id: "C1".to_string(),
            },
            RecordedCall::CloseAsResolved {
                discussion_id: "D1".to_string(),
            },
        ]
    );
    assert!(!has_label_or_reply(&calls));
}

#[tokio::test]
async fn integration_stale_proposal_closes_as_outdated_or_is_accepted() {
    let closing = TriageConfig {
        close_stale_as_answered: false,
        ..TriageConfig::default()
    };
    let mut comment = proposed_comment("C2", Duration::days(10));
    // Only the bot's own instructions reply exists, so nobody has engaged.
    comment.replies = vec![CommentReply {
        author_login: Some(closing.bot_login.clone()),
        body_text: closing.instructions_text.clone(),
    }];
    comment.reply_count = 1;

    let repository = seeded_repository()
        .with_discussion(discussion("D2", 2))
        .with_comments(2, vec![comment.clone()]);
    sweep(&repository, &closing).await.expect("sweep");
    assert_eq!(
        repository.calls(),
        vec![
            RecordedCall::AddComment {
                discussion_id: "D2".to_string(),
                body: closing.stale_response_text.clone(),
            },
            RecordedCall::CloseAsOutdated {
                discussion_id: "D2".to_string(),
            },
        ]
    );

    let accepting = TriageConfig::default();
    let repository = seeded_repository()
        .with_discussion(discussion("D2", 2))
        .with_comments(2, vec![comment]);
    sweep(&repository, &accepting).await.expect("sweep");
    let calls = repository.calls();
    assert!(calls.contains(&RecordedCall::MarkAsAnswer {
        comment_id: "C2".to_string(),
    }));
    assert!(!calls
        .iter()
        .any(|call| matches!(call, RecordedCall::AddLabel { .. })));
    assert!(!calls
        .iter()
        .any(|call| matches!(call, RecordedCall::CloseAsOutdated { .. })));
}

#[tokio::test]
async fn integration_stale_proposal_without_replies_gets_instructions_first() {
    let config = TriageConfig::default();
    let repository = seeded_repository()
        .with_discussion(discussion("D2", 2))
        .with_comments(2, vec![proposed_comment("C2", Duration::days(10))]);

    sweep(&repository, &config).await.expect("sweep");
    assert_eq!(
        repository.calls(),
        vec![RecordedCall::AddReply {
            body: config.instructions_text.clone(),
            discussion_id: "D2".to_string(),
            reply_to_comment_id: "C2".to_string(),
        }]
    );
}

#[tokio::test]
async fn integration_locked_discussion_is_triaged_when_toggle_disabled() {
    let mut locked = discussion("D3", 3);
    locked.locked = true;
    let mut comment = proposed_comment("C3", Duration::hours(1));
    comment.reactions = vec![ReactionContent::Confused];

    let repository = seeded_repository()
        .with_discussion(locked.clone())
        .with_comments(3, vec![comment.clone()]);
    let config = TriageConfig {
        close_locked_discussions: false,
        ..TriageConfig::default()
    };
    sweep(&repository, &config).await.expect("sweep");
    assert_eq!(
        repository.calls(),
        vec![RecordedCall::AddLabel {
            discussion_id: "D3".to_string(),
            label_id: LABEL_ID.to_string(),
        }]
    );

    let repository = seeded_repository()
        .with_discussion(locked)
        .with_comments(3, vec![comment]);
    sweep(&repository, &TriageConfig::default())
        .await
        .expect("sweep");
    assert!(repository.calls().is_empty());
}

#[tokio::test]
async fn integration_multiple_categories_are_swept_in_order() {
    let mut other = discussion("D9", 9);
    other.category_id = "DIC_kwDOhelp".to_string();
    let repository = seeded_repository()
        .with_category("DIC_kwDOhelp", true)
        .with_discussion(discussion("D4", 4))
        .with_comments(4, vec![proposed_comment("C4", Duration::hours(2))])
        .with_discussion(other)
        .with_comments(9, vec![proposed_comment("C9", Duration::hours(2))]);

    sweep(&repository, &TriageConfig::default())
        .await
        .expect("sweep");
    let replied_to = repository
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            RecordedCall::AddReply {
                reply_to_comment_id,
                ..
            } => Some(reply_to_comment_id),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(replied_to, vec!["C4".to_string(), "C9".to_string()]);
    assert_eq!(
        repository
            .page_requests()
            .into_iter()
            .map(|(category, _)| category)
            .collect::<Vec<_>>(),
        vec![CATEGORY.to_string(), "DIC_kwDOhelp".to_string()]
    );
}
