use crate::model::{Action, AheadBehind, Classification, RepositoryState, SkipReason};

/// Map a snapshot to the corrective action. Pure and total: the first
/// matching condition wins, in the order fetch, upstream, dirtiness, counts.
pub fn decide(state: &RepositoryState) -> Action {
    if !state.fetch_succeeded {
        return Action::skip(SkipReason::FetchFailed);
    }
    if !state.has_upstream {
        return Action::skip(SkipReason::NoUpstream);
    }
    if state.is_dirty {
        return Action::skip(SkipReason::UncommittedChanges);
    }
    match state.ahead_behind {
        None => Action::skip(SkipReason::StatusUnknown),
        Some(AheadBehind { ahead: 0, behind: 0 }) => Action::skip(SkipReason::UpToDate),
        Some(AheadBehind { ahead: _, behind: 0 }) => Action::Push,
        Some(AheadBehind { ahead: 0, behind: _ }) => Action::Pull,
        Some(_) => Action::PushThenPull,
    }
}

/// Describe the snapshot with the same precedence as [`decide`].
pub fn classify(state: &RepositoryState) -> Classification {
    if !state.fetch_succeeded {
        return Classification::FetchFailed;
    }
    if !state.has_upstream {
        return Classification::NoUpstream;
    }
    if state.is_dirty {
        return Classification::Dirty;
    }
    match state.ahead_behind {
        None => Classification::Unknown,
        Some(AheadBehind { ahead: 0, behind: 0 }) => Classification::UpToDate,
        Some(AheadBehind { ahead, behind: 0 }) => Classification::Ahead { ahead },
        Some(AheadBehind { ahead: 0, behind }) => Classification::Behind { behind },
        Some(AheadBehind { ahead, behind }) => Classification::Diverged { ahead, behind },
    }
}
