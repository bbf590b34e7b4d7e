//! Fake — test double for the log service.
//!
//! [`FakeLogs`] implements [`LogsOps`] from in-memory state. Groups and
//! streams are seeded up front; event pages are served in seeding order
//! and an exhausted queue yields empty final pages, which is what watch
//! mode sees once it catches up. Call counters and a request log expose
//! what the pipeline actually asked for.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::client::{
    EventPage, FilterRequest, GroupPage, LogEvent, LogsOps, StreamInfo, StreamPage,
};
use crate::error::{CloudtailError, Result};

/// Mutable inner state protected by a mutex.
#[derive(Default)]
struct Inner {
    groups: Vec<String>,
    streams: HashMap<String, Vec<StreamInfo>>,
    event_pages: VecDeque<EventPage>,
    page_size: Option<usize>,
    fail_next: Option<CloudtailError>,
    group_calls: usize,
    stream_calls: usize,
    filter_calls: usize,
    filter_log: Vec<(FilterRequest, Option<String>)>,
}

/// A fake log service client for deterministic tests.
///
/// All methods operate on in-memory state seeded before the test body
/// runs. Listings serve everything in one page unless [`paginate`]
/// chops them up.
///
/// [`paginate`]: FakeLogs::paginate
pub struct FakeLogs {
    inner: Mutex<Inner>,
}

impl FakeLogs {
    /// Create an empty fake client.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Seed a log group.
    pub async fn add_group(&self, name: &str) {
        self.inner.lock().await.groups.push(name.to_string());
    }

    /// Seed a stream into a group.
    pub async fn add_stream(&self, group: &str, stream: StreamInfo) {
        let mut state = self.inner.lock().await;
        state.streams.entry(group.to_string()).or_default().push(stream);
    }

    /// Queue one event page. `more` decides whether the page carries a
    /// continuation token.
    pub async fn push_events(&self, events: Vec<LogEvent>, more: bool) {
        let mut state = self.inner.lock().await;
        let index = state.event_pages.len();
        state.event_pages.push_back(EventPage {
            events,
            next_token: more.then(|| format!("page-{}", index + 1)),
        });
    }

    /// Serve listings in pages of `size` instead of all at once.
    pub async fn paginate(&self, size: usize) {
        self.inner.lock().await.page_size = Some(size);
    }

    /// Make the next call, whatever it is, fail with `err`.
    pub async fn fail_next(&self, err: CloudtailError) {
        self.inner.lock().await.fail_next = Some(err);
    }

    /// How many stream listing calls were made.
    pub async fn stream_calls(&self) -> usize {
        self.inner.lock().await.stream_calls
    }

    /// How many group listing calls were made.
    pub async fn group_calls(&self) -> usize {
        self.inner.lock().await.group_calls
    }

    /// How many event search calls were made.
    pub async fn filter_calls(&self) -> usize {
        self.inner.lock().await.filter_calls
    }

    /// Every event search call: the request and the token it carried.
    pub async fn filter_log(&self) -> Vec<(FilterRequest, Option<String>)> {
        self.inner.lock().await.filter_log.clone()
    }
}

impl Default for FakeLogs {
    fn default() -> Self {
        Self::new()
    }
}

/// Slice one page out of a full listing. The token is the start offset
/// of the next page, rendered as text.
fn slice_page<T: Clone>(
    items: Vec<T>,
    page_size: Option<usize>,
    token: Option<String>,
) -> (Vec<T>, Option<String>) {
    let size = page_size.unwrap_or(usize::MAX);
    let offset = token
        .and_then(|t| t.parse::<usize>().ok())
        .unwrap_or(0)
        .min(items.len());
    let end = offset.saturating_add(size).min(items.len());
    let next = (end < items.len()).then(|| end.to_string());
    (items[offset..end].to_vec(), next)
}

// ── LogsOps implementation ──────────────────────────────────────

#[async_trait]
impl LogsOps for FakeLogs {
    async fn describe_groups(
        &self,
        prefix: Option<&str>,
        token: Option<String>,
    ) -> Result<GroupPage> {
        let mut state = self.inner.lock().await;
        state.group_calls += 1;
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        let matching: Vec<String> = state
            .groups
            .iter()
            .filter(|name| prefix.map_or(true, |p| name.starts_with(p)))
            .cloned()
            .collect();
        let (groups, next_token) = slice_page(matching, state.page_size, token);
        Ok(GroupPage { groups, next_token })
    }

    async fn describe_streams(&self, group: &str, token: Option<String>) -> Result<StreamPage> {
        let mut state = self.inner.lock().await;
        state.stream_calls += 1;
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        let all = state
            .streams
            .get(group)
            .cloned()
            .ok_or_else(|| CloudtailError::GroupNotFound(group.to_string()))?;
        let (streams, next_token) = slice_page(all, state.page_size, token);
        Ok(StreamPage {
            streams,
            next_token,
        })
    }

    async fn filter_events(
        &self,
        request: &FilterRequest,
        token: Option<String>,
    ) -> Result<EventPage> {
        let mut state = self.inner.lock().await;
        state.filter_calls += 1;
        state.filter_log.push((request.clone(), token));
        if let Some(err) = state.fail_next.take() {
            return Err(err);
        }
        Ok(state.event_pages.pop_front().unwrap_or_default())
    }
}

// ── Tests ───────────────────────────────────────────────────────
