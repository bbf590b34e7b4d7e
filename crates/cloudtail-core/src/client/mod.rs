//! Client — the seam between the pipeline and the CloudWatch Logs API.
//!
//! [`LogsOps`] exposes the three paged operations the pipeline needs.
//! [`CloudWatchClient`] speaks to the real service; [`FakeLogs`] serves
//! canned pages for tests. Every call is a single page request, so the
//! caller owns pagination and watch mode can re-issue the search.

pub mod aws;
pub mod fake;

use async_trait::async_trait;

use crate::error::Result;

pub use aws::CloudWatchClient;
pub use fake::FakeLogs;

// ── Wire types ──────────────────────────────────────────────────

/// Stream metadata from a listing call.
///
/// The activity timestamps are absent on streams that never received an
/// event; time-window filtering treats those streams as always relevant.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    pub name: String,
    /// Timestamp (ms) of the oldest stored event.
    pub first_event_at: Option<i64>,
    /// Timestamp (ms) of the newest stored event. Lags behind ingestion.
    pub last_event_at: Option<i64>,
    /// Last time (ms) the stream accepted an event.
    pub last_ingestion_at: Option<i64>,
}

/// A single log event as served by the API.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEvent {
    /// Service-assigned identifier, unique within the group. Watch mode
    /// keys its duplicate suppression on it.
    pub id: String,
    pub group: String,
    pub stream: String,
    pub message: String,
    /// Event creation time (ms since the Unix epoch).
    pub timestamp: i64,
    /// Time (ms) the service ingested the event.
    pub ingestion_time: i64,
}

/// Parameters of one event search, minus the continuation token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterRequest {
    pub group: String,
    /// Explicit stream names, or `None` to search the whole group.
    pub streams: Option<Vec<String>>,
    /// Inclusive lower bound (ms) on event timestamps.
    pub start: Option<i64>,
    /// Inclusive upper bound (ms) on event timestamps.
    pub end: Option<i64>,
    /// Server-side filter expression, passed through verbatim.
    pub filter_pattern: Option<String>,
}

/// One page of group names.
#[derive(Clone, Debug, Default)]
pub struct GroupPage {
    pub groups: Vec<String>,
    pub next_token: Option<String>,
}

/// One page of stream metadata.
#[derive(Clone, Debug, Default)]
pub struct StreamPage {
    pub streams: Vec<StreamInfo>,
    pub next_token: Option<String>,
}

/// One page of events.
#[derive(Clone, Debug, Default)]
pub struct EventPage {
    pub events: Vec<LogEvent>,
    pub next_token: Option<String>,
}

// ── Operations ──────────────────────────────────────────────────

/// The log service operations the pipeline is built on.
#[async_trait]
pub trait LogsOps: Send + Sync {
    /// Fetch one page of log groups, optionally restricted by name prefix.
    async fn describe_groups(
        &self,
        prefix: Option<&str>,
        token: Option<String>,
    ) -> Result<GroupPage>;

    /// Fetch one page of stream metadata for a group.
    async fn describe_streams(&self, group: &str, token: Option<String>) -> Result<StreamPage>;

    /// Fetch one page of events matching `request`. A returned token means
    /// the server may have more; pass it back to continue the search.
    async fn filter_events(
        &self,
        request: &FilterRequest,
        token: Option<String>,
    ) -> Result<EventPage>;
}
