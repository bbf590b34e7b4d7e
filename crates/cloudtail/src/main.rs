//! cloudtail — list and tail AWS CloudWatch Logs from the terminal.

mod cli;

use std::io;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cloudtail_core::client::CloudWatchClient;
use cloudtail_core::error::Result;
use cloudtail_core::tail;
use cloudtail_core::{CloudtailError, Config};

use crate::cli::{Cli, Command};

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudtail=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();
    let color_enabled = !cli.no_color;

    let mut config: Option<Config> = None;
    if let Err(err) = run(cli, &mut config).await {
        report(&err, config.as_ref(), color_enabled);
        process::exit(err.exit_code());
    }
}

async fn run(cli: Cli, config_slot: &mut Option<Config>) -> Result<()> {
    let client = CloudWatchClient::connect(cli.aws_region, cli.aws_profile).await;
    // io::stdout() rather than its lock: the sink must stay Send.
    let mut out = io::stdout();

    match cli.command {
        Command::Groups { prefix } => tail::list_groups(&client, prefix.as_deref(), &mut out).await,
        Command::Streams { log_group } => tail::list_streams(&client, &log_group, &mut out).await,
        Command::Get(args) => {
            let config = args.into_config(!cli.no_color)?;
            *config_slot = Some(config.clone());
            debug!(group = %config.log_group_name, watch = config.watch, "starting tail");

            let cancel = CancellationToken::new();
            let interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    interrupt.cancel();
                }
            });

            tail::list_logs(&client, &config, &mut out, cancel.clone()).await?;
            if cancel.is_cancelled() {
                eprintln!("Closing...");
            }
            Ok(())
        }
    }
}

/// Known failures get their hint; anything unexpected gets a report the
/// user can paste into an issue.
fn report(err: &CloudtailError, config: Option<&Config>, color_enabled: bool) {
    match err {
        CloudtailError::Unexpected(_) | CloudtailError::Api { .. } => bug_report(err, config),
        _ => {
            let hint = err.hint();
            if color_enabled {
                eprintln!("{}", hint.red());
            } else {
                eprintln!("{hint}");
            }
        }
    }
}

fn bug_report(err: &CloudtailError, config: Option<&Config>) {
    eprintln!("{}", "=".repeat(80));
    eprintln!("You've found a bug! Please open an issue attaching this report.");
    eprintln!("{}", "-".repeat(80));
    eprintln!("Version: {}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "Platform: {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    match config {
        Some(config) => match serde_json::to_string(config) {
            Ok(json) => eprintln!("Config: {json}"),
            Err(_) => eprintln!("Config: {config:?}"),
        },
        None => eprintln!("Config: <not resolved>"),
    }
    eprintln!("Args: {:?}", std::env::args().collect::<Vec<_>>());
    eprintln!("Error: {err}");
    eprintln!("{}", "=".repeat(80));
}
