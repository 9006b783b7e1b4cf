use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use repoglance::config::Config;
use repoglance::poller::Poller;
use repoglance::provider::GitCli;
use repoglance::render;
use repoglance::repo_status::PollResult;

#[derive(Parser, Debug)]
#[command(name = "repoglance", version, about = "Watches local Git working copies and reports their sync state against the remote")]
struct Cli {
    /// Never run `git fetch`; classify from local state only
    #[arg(long)]
    no_fetch: bool,

    /// Repository list file (default: the repos file in the repoglance
    /// config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seconds between periodic local-only polls
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    period: u64,

    /// Seconds to wait for `git fetch` before giving up on the remote
    #[arg(long, default_value_t = 30)]
    fetch_timeout: u64,

    /// Emit each poll as one JSON object instead of the human summary
    #[arg(long)]
    json: bool,

    /// Poll once, print, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    info!(repos = config.repos.len(), "loaded repository list");

    let provider = GitCli::new(Duration::from_secs(cli.fetch_timeout));
    let poller = Poller::new(config.repos, provider);

    let json = cli.json;
    let deliver = move |result: &PollResult| {
        if json {
            match render::render_json(result) {
                Ok(line) => println!("{line}"),
                Err(err) => error!(%err, "could not encode poll result"),
            }
        } else {
            print!("{}", render::render_human(result));
        }
        // A pipe consumer (status bar) should see each poll promptly.
        let _ = std::io::Write::flush(&mut std::io::stdout());
    };

    if cli.once {
        let result = poller.poll(!cli.no_fetch).await;
        deliver(&result);
        return Ok(());
    }

    poller
        .run(Duration::from_secs(cli.period), !cli.no_fetch, deliver)
        .await
}
