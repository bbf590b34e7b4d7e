//! Config — the resolved run configuration handed to the pipeline.
//!
//! Built by the CLI layer; the core never parses flags. Time bounds arrive
//! already resolved to epoch milliseconds. The record is `Serialize` so the
//! bug-report bundle can dump it; it never holds credentials.

use serde::Serialize;

use crate::tail::ALL_WILDCARD;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub log_group_name: String,
    /// Stream name pattern; `ALL` selects every stream in the group.
    pub log_stream_pattern: String,
    /// Free-text filter expression, passed verbatim to the service.
    pub filter_pattern: Option<String>,
    /// Dot-path extraction applied to JSON-shaped messages.
    pub query: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub watch: bool,
    pub watch_interval_secs: u64,
    pub output_group_enabled: bool,
    pub output_stream_enabled: bool,
    pub output_timestamp_enabled: bool,
    pub output_ingestion_time_enabled: bool,
    pub color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_group_name: String::new(),
            log_stream_pattern: ALL_WILDCARD.to_string(),
            filter_pattern: None,
            query: None,
            start: None,
            end: None,
            watch: false,
            watch_interval_secs: 2,
            output_group_enabled: true,
            output_stream_enabled: true,
            output_timestamp_enabled: false,
            output_ingestion_time_enabled: false,
            color_enabled: true,
        }
    }
}
