use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::provider::StatusProvider;
use crate::repo_status::{PollEntry, PollResult, RepoStatus, SyncState};

/// Walks the configured working copies and classifies each one. Holds no
/// state between polls beyond the immutable path list.
pub struct Poller<P> {
    repos: Vec<PathBuf>,
    provider: P,
}

impl<P: StatusProvider> Poller<P> {
    pub fn new(repos: Vec<PathBuf>, provider: P) -> Self {
        Self { repos, provider }
    }

    /// Classify one working copy. Never fails: a missing directory, a
    /// broken repository, or a vanished path mid-poll all collapse into
    /// [`RepoStatus::NO_STATE`] for this directory alone.
    pub async fn classify(&self, path: &Path, refresh_remote: bool) -> RepoStatus {
        if !path.is_dir() {
            debug!(path = %path.display(), "directory missing, reporting no state");
            return RepoStatus::NO_STATE;
        }

        if refresh_remote {
            // Best effort. A dead network or a repo with no remote must not
            // stop the local classification.
            if let Err(err) = self.provider.refresh_remote(path).await {
                warn!(path = %path.display(), %err, "remote refresh failed, using local state");
            }
        }

        let text = match self.provider.status_text(path).await {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), %err, "status query failed");
                return RepoStatus::NO_STATE;
            }
        };
        let sync_state = SyncState::from_status_text(&text);

        let modified_count = match self.provider.modified_files(path).await {
            Ok(files) => files.len(),
            Err(err) => {
                warn!(path = %path.display(), %err, "modified-file listing failed");
                return RepoStatus::NO_STATE;
            }
        };

        RepoStatus {
            sync_state,
            modified_count,
        }
    }

    /// One full pass in configuration order. Always returns an entry for
    /// every configured path, no omissions and no extras.
    pub async fn poll(&self, refresh_remote: bool) -> PollResult {
        let mut repos = Vec::with_capacity(self.repos.len());
        for path in &self.repos {
            let status = self.classify(path, refresh_remote).await;
            debug!(path = %path.display(), ?status, "classified");
            repos.push(PollEntry {
                path: path.clone(),
                status,
            });
        }
        PollResult::new(repos)
    }

    /// Poll once eagerly with remote refresh on, then on a fixed period
    /// with remote refresh off. SIGUSR1 forces an immediate refreshed poll
    /// without disturbing the periodic schedule.
    ///
    /// `fetch_enabled = false` suppresses remote refresh everywhere,
    /// including the startup and signal-triggered polls.
    pub async fn run<F>(&self, period: Duration, fetch_enabled: bool, deliver: F) -> Result<()>
    where
        F: FnMut(&PollResult),
    {
        let mut usr1 =
            signal(SignalKind::user_defined1()).context("could not install SIGUSR1 handler")?;
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            while usr1.recv().await.is_some() {
                // A signal arriving while one is already queued is dropped.
                let _ = tx.try_send(());
            }
        });
        self.run_with_trigger(period, fetch_enabled, rx, deliver).await
    }

    /// The poll loop behind [`Poller::run`], with the manual-refresh
    /// trigger exposed as a channel. One task owns the loop, so polls are
    /// processed strictly one at a time and can never overlap; a trigger
    /// poll does not reset the periodic timer's schedule.
    pub async fn run_with_trigger<F>(
        &self,
        period: Duration,
        fetch_enabled: bool,
        mut manual: mpsc::Receiver<()>,
        mut deliver: F,
    ) -> Result<()>
    where
        F: FnMut(&PollResult),
    {
        // interval() panics on a zero period
        let period = period.max(Duration::from_millis(1));
        info!(repos = self.repos.len(), ?period, fetch_enabled, "starting poll loop");
        let result = self.poll(fetch_enabled).await;
        deliver(&result);

        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of an interval fires immediately; the startup poll
        // already covered it.
        ticks.tick().await;

        loop {
            let refresh_remote = tokio::select! {
                _ = ticks.tick() => false,
                Some(()) = manual.recv() => {
                    info!("manual refresh requested");
                    true
                }
            };
            let result = self.poll(refresh_remote && fetch_enabled).await;
            deliver(&result);
        }
    }
}
