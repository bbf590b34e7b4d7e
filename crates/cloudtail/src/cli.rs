//! Command-line surface.
//!
//! Argument parsing lives here, as does the translation of the `get`
//! arguments into a pipeline [`Config`]. Time expressions are resolved
//! during that translation, so a bad date aborts before any network
//! traffic happens.

use clap::{Args, Parser, Subcommand};

use cloudtail_core::datetime;
use cloudtail_core::error::Result;
use cloudtail_core::tail::ALL_WILDCARD;
use cloudtail_core::Config;

#[derive(Debug, Parser)]
#[command(
    name = "cloudtail",
    version,
    about = "List and tail AWS CloudWatch Logs groups, streams and events"
)]
pub struct Cli {
    /// AWS region to query; defaults to the profile or environment.
    #[arg(long, global = true, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// Named profile from the AWS credentials file.
    #[arg(long, global = true, env = "AWS_PROFILE")]
    pub aws_profile: Option<String>,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available log groups
    Groups {
        /// Only list groups whose name starts with this prefix.
        #[arg(long)]
        prefix: Option<String>,
    },
    /// List streams in a log group
    Streams {
        /// Group to list streams for.
        log_group: String,
    },
    /// Fetch log events, oldest first
    Get(GetArgs),
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Group to fetch events from.
    pub log_group: String,

    /// Stream pattern, matched from the start of the stream name.
    /// The default selects every stream in the group.
    #[arg(default_value = ALL_WILDCARD)]
    pub log_stream_pattern: String,

    /// Oldest event to fetch, as a relative ("5m", "2 weeks ago") or
    /// absolute ("2026-08-25 13:00:00") expression.
    #[arg(short, long, default_value = "5m")]
    pub start: String,

    /// Newest event to fetch; unbounded when omitted.
    #[arg(short, long)]
    pub end: Option<String>,

    /// Keep polling for new events after the range is drained.
    #[arg(short, long)]
    pub watch: bool,

    /// Seconds between polls in watch mode.
    #[arg(long, default_value_t = 2, value_name = "SECONDS")]
    pub watch_interval: u64,

    /// Server-side filter expression applied to events.
    #[arg(short = 'f', long)]
    pub filter_pattern: Option<String>,

    /// Dot-separated path to extract from JSON-bodied messages.
    #[arg(short, long)]
    pub query: Option<String>,

    /// Hide the group column.
    #[arg(long)]
    pub no_group: bool,

    /// Hide the stream column.
    #[arg(long)]
    pub no_stream: bool,

    /// Show the event timestamp column.
    #[arg(long)]
    pub timestamp: bool,

    /// Show the ingestion timestamp column.
    #[arg(long)]
    pub ingestion_time: bool,
}

impl GetArgs {
    /// Resolve the argument surface into a pipeline [`Config`].
    pub fn into_config(self, color_enabled: bool) -> Result<Config> {
        let end = match &self.end {
            Some(text) => datetime::parse(text)?,
            None => None,
        };
        Ok(Config {
            log_group_name: self.log_group,
            log_stream_pattern: self.log_stream_pattern,
            filter_pattern: self.filter_pattern,
            query: self.query,
            start: datetime::parse(&self.start)?,
            end,
            watch: self.watch,
            watch_interval_secs: self.watch_interval,
            output_group_enabled: !self.no_group,
            output_stream_enabled: !self.no_stream,
            output_timestamp_enabled: self.timestamp,
            output_ingestion_time_enabled: self.ingestion_time,
            color_enabled,
        })
    }
}
