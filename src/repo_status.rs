use std::path::PathBuf;

use serde::Serialize;

/// Relationship between a local branch and its remote counterpart, as
/// inferred from `git status` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    Ahead,
    Behind,
    Diverged,
    UpToDate,
    /// Directory missing, no tracking branch, or status text matched no
    /// known marker.
    NoState,
}

impl SyncState {
    /// Infer the sync state from human-readable `git status` output by
    /// testing for marker substrings. The text can contain more than one
    /// marker (the "diverged" message also mentions being up to date), so
    /// matching order is fixed: ahead, diverged, behind, up to date.
    pub fn from_status_text(text: &str) -> Self {
        if text.contains("ahead") {
            SyncState::Ahead
        } else if text.contains("diverged") {
            SyncState::Diverged
        } else if text.contains("behind") {
            SyncState::Behind
        } else if text.contains("up to date") || text.contains("up-to-date") {
            // git switched from "up-to-date" to "up to date" in 2.16
            SyncState::UpToDate
        } else {
            SyncState::NoState
        }
    }

    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            SyncState::Ahead | SyncState::Behind | SyncState::Diverged
        )
    }
}

/// The result of classifying one working copy at one point in time.
/// Recomputed on every poll, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    pub sync_state: SyncState,
    pub modified_count: usize,
}

impl RepoStatus {
    /// What a directory reports when it cannot be inspected at all.
    pub const NO_STATE: RepoStatus = RepoStatus {
        sync_state: SyncState::NoState,
        modified_count: 0,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: RepoStatus,
}

/// One full pass over the configured working copies, in configuration
/// order. Every configured path appears exactly once, even when it no
/// longer exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollResult {
    pub repos: Vec<PollEntry>,
    pub attention_required: bool,
}

impl PollResult {
    pub fn new(repos: Vec<PollEntry>) -> Self {
        let attention_required = repos
            .iter()
            .any(|entry| entry.status.sync_state.needs_attention());
        Self {
            repos,
            attention_required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_each_marker() {
        let cases = [
            (
                "Your branch is ahead of 'origin/main' by 2 commits.",
                SyncState::Ahead,
            ),
            (
                "Your branch is behind 'origin/main' by 1 commit, and can be fast-forwarded.",
                SyncState::Behind,
            ),
            (
                "Your branch and 'origin/main' have diverged,",
                SyncState::Diverged,
            ),
            (
                "Your branch is up to date with 'origin/main'.",
                SyncState::UpToDate,
            ),
        ];
        for (text, expected) in cases {
            assert_eq!(SyncState::from_status_text(text), expected, "{text}");
        }
    }

    #[test]
    fn legacy_hyphenated_spelling_is_up_to_date() {
        assert_eq!(
            SyncState::from_status_text("Your branch is up-to-date with 'origin/master'."),
            SyncState::UpToDate
        );
    }

    #[test]
    fn unmatched_text_is_no_state() {
        assert_eq!(
            SyncState::from_status_text("On branch main\nnothing to commit"),
            SyncState::NoState
        );
        assert_eq!(SyncState::from_status_text(""), SyncState::NoState);
    }

    #[test]
    fn diverged_beats_up_to_date() {
        let text = "Your branch and 'origin/main' have diverged; \
                    once resolved it will be up to date again.";
        assert_eq!(SyncState::from_status_text(text), SyncState::Diverged);
    }

    #[test]
    fn ahead_beats_every_other_marker() {
        let text = "ahead diverged behind up to date";
        assert_eq!(SyncState::from_status_text(text), SyncState::Ahead);
    }

    #[test]
    fn attention_follows_sync_state() {
        assert!(SyncState::Ahead.needs_attention());
        assert!(SyncState::Behind.needs_attention());
        assert!(SyncState::Diverged.needs_attention());
        assert!(!SyncState::UpToDate.needs_attention());
        assert!(!SyncState::NoState.needs_attention());
    }

    #[test]
    fn poll_result_derives_attention_flag() {
        let quiet = PollResult::new(vec![PollEntry {
            path: PathBuf::from("/repo/a"),
            status: RepoStatus {
                sync_state: SyncState::UpToDate,
                modified_count: 3,
            },
        }]);
        assert!(!quiet.attention_required);

        let loud = PollResult::new(vec![
            PollEntry {
                path: PathBuf::from("/repo/a"),
                status: RepoStatus {
                    sync_state: SyncState::UpToDate,
                    modified_count: 0,
                },
            },
            PollEntry {
                path: PathBuf::from("/repo/b"),
                status: RepoStatus {
                    sync_state: SyncState::Behind,
                    modified_count: 0,
                },
            },
        ]);
        assert!(loud.attention_required);

        let unknown = PollResult::new(vec![PollEntry {
            path: PathBuf::from("/repo/gone"),
            status: RepoStatus::NO_STATE,
        }]);
        assert!(!unknown.attention_required);
    }
}
