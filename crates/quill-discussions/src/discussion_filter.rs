use crate::discussion_types::Discussion;
use crate::triage_config::TriageConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Optional mutation applied to a discussion that is otherwise skipped.
pub enum SkipFollowUp {
    None,
    CloseAsResolved,
    /// Best-effort reopen so locked threads stay searchable.
    Reopen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of the discussion-level filter.
pub enum DiscussionDisposition {
    Malformed,
    Locked { follow_up: SkipFollowUp },
    Answered { follow_up: SkipFollowUp },
    Closed,
    Triage,
}

impl DiscussionDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Locked { .. } => "locked",
            Self::Answered { .. } => "answered",
            Self::Closed => "closed",
            Self::Triage => "triage",
        }
    }

    pub fn follow_up(&self) -> SkipFollowUp {
        match self {
            Self::Locked { follow_up } | Self::Answered { follow_up } => *follow_up,
            Self::Malformed | Self::Closed | Self::Triage => SkipFollowUp::None,
        }
    }
}

/// Decide whether a discussion is skipped or handed to comment triage.
pub fn evaluate_discussion(
    discussion: &Discussion,
    config: &TriageConfig,
) -> DiscussionDisposition {
    if discussion.id.trim().is_empty() || discussion.number == 0 {
        return DiscussionDisposition::Malformed;
    }
    if discussion.locked && config.close_locked_discussions {
        let follow_up = if config.resolve_locked_discussions && !discussion.closed {
            SkipFollowUp::CloseAsResolved
        } else if config.reopen_locked_discussions && discussion.closed {
            SkipFollowUp::Reopen
        } else {
            SkipFollowUp::None
        };
        return DiscussionDisposition::Locked { follow_up };
    }
    if discussion.is_answered() && config.close_answered_discussions {
        let follow_up = if config.resolve_answered_discussions && !discussion.closed {
            SkipFollowUp::CloseAsResolved
        } else {
            SkipFollowUp::None
        };
        return DiscussionDisposition::Answered { follow_up };
    }
    if discussion.closed {
        return DiscussionDisposition::Closed;
    }
    DiscussionDisposition::Triage
}
