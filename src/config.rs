use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{Context, Result};

/// The list of working copies to watch. Loaded once at startup and
/// immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repos: Vec<PathBuf>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        Self::config_home().join("repos")
    }

    /// Location of all config. By default
    ///
    /// Linux   :   $XDG_CONFIG_HOME/repoglance or $HOME/.config/repoglance
    /// macOS   :   $HOME/Library/Application Support/repoglance
    ///
    /// This can be overridden by setting REPOGLANCE_CONFIG_HOME.
    fn config_home() -> PathBuf {
        // The environment variable lets tests run against a scratch
        // directory instead of the real user config.
        if let Ok(env_var) = env::var("REPOGLANCE_CONFIG_HOME") {
            if !env_var.is_empty() {
                return env_var.into();
            }
        }

        dirs::config_dir()
            .expect(
                "Could not find your config directory. The default is ~/.config/repoglance but \
                 it can also be controlled by setting the REPOGLANCE_CONFIG_HOME environment \
                 variable.",
            )
            .join("repoglance")
    }

    /// Load the repository list, from `path` when given, otherwise from the
    /// default location. A missing file is fatal for the whole process, so
    /// the error spells out how to fix it.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        let text = fs::read_to_string(&path).with_context(|| {
            format!(
                "could not read the repository list at `{}`. Create it with one working copy \
                 path per line (blank lines and lines starting with '#' are ignored), or point \
                 --config at an existing file.",
                path.display()
            )
        })?;
        Ok(Self::parse(&text))
    }

    /// One path per line; blank lines and `#` comments are skipped,
    /// surrounding whitespace is stripped.
    fn parse(text: &str) -> Self {
        let repos = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(PathBuf::from)
            .collect();
        Self { repos }
    }
}
