use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

/// The capabilities the classifier needs from a version-control tool.
///
/// Keeping this behind a trait means the classifier never knows which
/// concrete tool answers it, and tests can substitute canned output.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Update local knowledge of the remote's state without touching the
    /// working tree. Idempotent; callers may skip it on failure.
    async fn refresh_remote(&self, path: &Path) -> Result<()>;

    /// Human-readable synchronization summary. Expected to contain one of
    /// the recognized marker substrings when a tracking branch exists.
    async fn status_text(&self, path: &Path) -> Result<String>;

    /// Tracked files with uncommitted modifications. An empty list is a
    /// valid answer.
    async fn modified_files(&self, path: &Path) -> Result<Vec<String>>;
}

/// [`StatusProvider`] backed by the `git` binary for fetch and status and
/// by libgit2 for the modified-file listing.
pub struct GitCli {
    fetch_timeout: Duration,
}

impl GitCli {
    pub fn new(fetch_timeout: Duration) -> Self {
        Self { fetch_timeout }
    }

    fn git_command(path: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(path)
            // Marker matching depends on git's English output.
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run_git(path: &Path, args: &[&str]) -> Result<std::process::Output> {
        Self::git_command(path, args)
            .output()
            .await
            .with_context(|| format!("failed to run git {:?} in {}", args, path.display()))
    }
}

#[async_trait]
impl StatusProvider for GitCli {
    async fn refresh_remote(&self, path: &Path) -> Result<()> {
        // Fetch does network I/O and can stall indefinitely; everything else
        // this provider runs is local and near-instant, so only fetch gets a
        // deadline. kill_on_drop reaps the subprocess when the timeout wins.
        let output = tokio::time::timeout(self.fetch_timeout, Self::run_git(path, &["fetch", "--quiet"]))
            .await
            .with_context(|| {
                format!(
                    "git fetch in {} did not finish within {:?}",
                    path.display(),
                    self.fetch_timeout
                )
            })??;
        if !output.status.success() {
            bail!(
                "git fetch in {} exited with {}: {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }

    async fn status_text(&self, path: &Path) -> Result<String> {
        let output = Self::run_git(path, &["status"]).await?;
        if !output.status.success() {
            bail!(
                "git status in {} exited with {}: {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn modified_files(&self, path: &Path) -> Result<Vec<String>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || modified_files_blocking(&path))
            .await
            .context("modified-file listing task failed")?
    }
}

fn modified_files_blocking(path: &Path) -> Result<Vec<String>> {
    let repo = git2::Repository::open(path)
        .with_context(|| format!("{} is not an openable git repository", path.display()))?;

    let mut options = git2::StatusOptions::new();
    options
        .include_untracked(false)
        .include_ignored(false)
        .include_unmodified(false);
    let statuses = repo
        .statuses(Some(&mut options))
        .with_context(|| format!("could not query statuses in {}", path.display()))?;

    let mut files = Vec::new();
    for entry in statuses.iter() {
        let status = entry.status();
        if status.is_wt_modified()
            || status.is_wt_deleted()
            || status.is_index_new()
            || status.is_index_modified()
            || status.is_index_deleted()
        {
            if let Some(file) = entry.path() {
                files.push(file.to_string());
            }
        }
    }
    Ok(files)
}
