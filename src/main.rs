use clap::Parser;
use feedtest::cli::{self, Cmd};
use feedtest_api::FeedsClient;
use feedtest_core::config::Config;
use feedtest_tui::Session;
use std::{path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(name = "feedtest", about = "Feeds Test UI — exercise the notification feeds API")]
struct Cli {
    /// Write debug logs to /tmp/feedtest-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    /// Feeds service base URL; overrides `service.base_url` in the config.
    #[arg(long)]
    url: Option<String>,

    /// Auth token; falls back to `service.token` in the config.
    #[arg(long, env = "FEEDS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Display name used to title your feed.
    #[arg(long, default_value = "user")]
    name: String,

    /// Read this config file instead of ~/.config/feedtest/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Cmd>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/feedtest-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("feedtest debug log started — tail -f /tmp/feedtest-debug.log");
    }

    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not load config, using defaults");
            Config::defaults()
        }),
    };
    if let Some(url) = cli.url {
        config.service.base_url = url;
    }
    let token = cli.token.or_else(|| config.service.token.clone());
    tracing::debug!(base_url = %config.service.base_url, has_token = token.is_some(), "starting");

    let runtime = tokio::runtime::Runtime::new()?;
    let client = FeedsClient::new(config.service.base_url.clone());

    match cli.command {
        None => {
            let session = Session { display_name: cli.name, token };
            feedtest_tui::run(config, Arc::new(client), runtime.handle().clone(), session)
        }
        Some(cmd) => {
            let mut out = std::io::stdout().lock();
            runtime.block_on(cli::run(
                cmd,
                &client,
                token.as_deref(),
                &config.ui.timestamp_format,
                &mut out,
            ))
        }
    }
}
