//! Tail — the event retrieval pipeline behind `get`.
//!
//! `resolve` turns a stream pattern into explicit stream names, `fetch`
//! walks the paginated search (and keeps polling in watch mode), `dedup`
//! drops events the service serves twice, `render` lays events out as
//! terminal lines, and `run` drives the whole thing into an output sink.

pub mod dedup;
pub mod fetch;
pub mod render;
pub mod resolve;
pub mod run;

/// Pattern value that selects every stream in the group.
pub const ALL_WILDCARD: &str = "ALL";

/// Most streams a single event search accepts.
pub const FILTER_EVENTS_STREAMS_LIMIT: usize = 100;

/// Most events one search response can carry; doubles as the size of
/// the dedup window so a full page of repeats is still recognized.
pub const MAX_EVENTS_PER_CALL: usize = 10_000;

pub use run::{list_groups, list_logs, list_streams};
