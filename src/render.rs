use std::fmt::Write;
use std::io::IsTerminal;

use chrono::Local;

use crate::repo_status::{PollResult, SyncState};

// Indexed: ok, ahead, behind, diverged, unknown, attention.
const SYMBOLS_FANCY: [&str; 6] = ["✓", "↑", "↓", "⇅", "?", "●"];
const SYMBOLS_PLAIN: [&str; 6] = ["[=]", "[>]", "[<]", "[x]", "[?]", "[!]"];

fn get_symbols() -> &'static [&'static str; 6] {
    // Explicit overrides first.
    if std::env::var("REPOGLANCE_PLAIN").is_ok() {
        return &SYMBOLS_PLAIN;
    }
    if std::env::var("REPOGLANCE_FANCY").is_ok() {
        return &SYMBOLS_FANCY;
    }

    // Not a terminal (e.g. piped into a status bar).
    if !std::io::stdout().is_terminal() {
        return &SYMBOLS_PLAIN;
    }

    // NO_COLOR is the standard switch for disabling color/unicode.
    if std::env::var("NO_COLOR").is_ok() {
        return &SYMBOLS_PLAIN;
    }

    if let Ok(term) = std::env::var("TERM") {
        let term = term.to_lowercase();
        if term == "dumb" || term == "vt100" || term.contains("linux") {
            return &SYMBOLS_PLAIN;
        }
    }

    // Most modern terminals handle unicode.
    &SYMBOLS_FANCY
}

fn state_symbol(symbols: &'static [&'static str; 6], state: SyncState) -> &'static str {
    match state {
        SyncState::UpToDate => symbols[0],
        SyncState::Ahead => symbols[1],
        SyncState::Behind => symbols[2],
        SyncState::Diverged => symbols[3],
        SyncState::NoState => symbols[4],
    }
}

/// Human summary of one poll: a timestamped header with the aggregate
/// indicator, then one line per working copy. Modified files show up as a
/// ` +N` suffix.
pub fn render_human(result: &PollResult) -> String {
    let symbols = get_symbols();
    let [ok, _, _, _, _, attention] = symbols;

    let out_of_sync = result
        .repos
        .iter()
        .filter(|entry| entry.status.sync_state.needs_attention())
        .count();
    let mut out = format!(
        "{} {} {} of {} repositories out of sync\n",
        Local::now().format("%H:%M:%S"),
        if result.attention_required { attention } else { ok },
        out_of_sync,
        result.repos.len(),
    );

    for entry in &result.repos {
        let _ = write!(
            out,
            "{} {}",
            state_symbol(symbols, entry.status.sync_state),
            entry.path.display()
        );
        if entry.status.modified_count > 0 {
            let _ = write!(out, " +{}", entry.status.modified_count);
        }
        out.push('\n');
    }
    out
}

/// One JSON object per poll, for piping into another program.
pub fn render_json(result: &PollResult) -> serde_json::Result<String> {
    serde_json::to_string(result)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serial_test::serial;

    use crate::repo_status::{PollEntry, RepoStatus};

    use super::*;

    fn sample() -> PollResult {
        PollResult::new(vec![
            PollEntry {
                path: PathBuf::from("/repo/a"),
                status: RepoStatus {
                    sync_state: SyncState::Ahead,
                    modified_count: 2,
                },
            },
            PollEntry {
                path: PathBuf::from("/repo/b"),
                status: RepoStatus {
                    sync_state: SyncState::UpToDate,
                    modified_count: 0,
                },
            },
        ])
    }

    #[test]
    #[serial]
    fn human_rendering_lists_every_repo_with_plain_symbols() {
        std::env::set_var("REPOGLANCE_PLAIN", "1");
        let out = render_human(&sample());
        std::env::remove_var("REPOGLANCE_PLAIN");

        assert!(out.contains("[!] 1 of 2 repositories out of sync"), "{out}");
        assert!(out.contains("[>] /repo/a +2"), "{out}");
        assert!(out.contains("[=] /repo/b\n"), "{out}");
        // Count suffix only appears for modified repos.
        assert!(!out.contains("/repo/b +"), "{out}");
    }

    #[test]
    fn json_rendering_carries_states_and_the_aggregate_flag() {
        let out = render_json(&sample()).unwrap();
        assert!(out.contains("\"attention_required\":true"), "{out}");
        assert!(out.contains("\"sync_state\":\"ahead\""), "{out}");
        assert!(out.contains("\"modified_count\":2"), "{out}");
        assert!(out.contains("/repo/b"), "{out}");
    }
}
