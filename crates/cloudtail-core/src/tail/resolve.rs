//! Resolve — which streams a pattern selects.
//!
//! Stream listings are lazy: each page is fetched only when the caller
//! pulls past the previous one. On top of the listing sit two filters,
//! a time-window relevance check against the stream's activity span and
//! a name pattern anchored to the start of the stream name.

use futures_util::stream::Stream;
use futures_util::TryStreamExt;
use regex::Regex;
use tracing::debug;

use crate::client::{LogsOps, StreamInfo};
use crate::error::{CloudtailError, Result};
use crate::tail::{ALL_WILDCARD, FILTER_EVENTS_STREAMS_LIMIT};

// ── Time window ─────────────────────────────────────────────────

/// Inclusive time bounds (ms) a stream's activity must overlap for the
/// stream to be worth searching.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeWindow {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeWindow {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    /// Whether the stream's activity span overlaps the window.
    ///
    /// A stream with no recorded first event is always relevant. The
    /// upper edge of the span is the last ingestion time, which stays
    /// fresh on actively written streams while the last event timestamp
    /// lags behind.
    pub fn covers(&self, stream: &StreamInfo) -> bool {
        let first = match stream.first_event_at {
            Some(ts) => ts,
            None => return true,
        };
        let span_start = first.max(self.start.unwrap_or(0));
        let span_end = stream
            .last_ingestion_at
            .unwrap_or(i64::MAX)
            .min(self.end.unwrap_or(i64::MAX));
        span_start <= span_end
    }
}

// ── Pattern ─────────────────────────────────────────────────────

/// Compiled stream-name pattern. Matching is anchored to the start of
/// the name; [`ALL_WILDCARD`] matches every name.
#[derive(Debug)]
pub struct StreamPattern {
    raw: String,
    regex: Regex,
}

impl StreamPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let effective = if pattern == ALL_WILDCARD { ".*" } else { pattern };
        let regex =
            Regex::new(&format!("^{effective}")).map_err(|source| {
                CloudtailError::InvalidStreamPattern {
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

// ── Listing and resolution ──────────────────────────────────────

/// Lazily list every stream in a group, following pagination tokens.
pub fn streams<'a>(
    client: &'a dyn LogsOps,
    group: &'a str,
) -> impl Stream<Item = Result<StreamInfo>> + 'a {
    async_stream::try_stream! {
        let mut token: Option<String> = None;
        loop {
            let page = client.describe_streams(group, token.take()).await?;
            debug!(group = %group, streams = page.streams.len(), "stream listing page");
            for stream in page.streams {
                yield stream;
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
    }
}

/// Stream names in `group` that overlap `window` and match `pattern`.
///
/// Every call walks a fresh listing, so collecting the stream twice
/// observes streams created in between.
pub fn match_streams<'a>(
    client: &'a dyn LogsOps,
    group: &'a str,
    pattern: &'a StreamPattern,
    window: TimeWindow,
) -> impl Stream<Item = Result<String>> + 'a {
    async_stream::try_stream! {
        for await stream in streams(client, group) {
            let stream = stream?;
            if window.covers(&stream) && pattern.matches(&stream.name) {
                yield stream.name;
            }
        }
    }
}

/// Resolve a pattern into the explicit stream list a search should
/// target. `None` means search the whole group: the wildcard never
/// lists streams at all.
pub async fn resolve_streams(
    client: &dyn LogsOps,
    group: &str,
    pattern: &str,
    window: TimeWindow,
) -> Result<Option<Vec<String>>> {
    if pattern == ALL_WILDCARD {
        return Ok(None);
    }
    let compiled = StreamPattern::new(pattern)?;
    let matched: Vec<String> = match_streams(client, group, &compiled, window)
        .try_collect()
        .await?;
    if matched.len() > FILTER_EVENTS_STREAMS_LIMIT {
        return Err(CloudtailError::TooManyStreams {
            pattern: pattern.to_string(),
            matched: matched.len(),
            limit: FILTER_EVENTS_STREAMS_LIMIT,
        });
    }
    if matched.is_empty() {
        return Err(CloudtailError::NoStreamsMatched {
            pattern: pattern.to_string(),
            group: group.to_string(),
        });
    }
    debug!(group = %group, pattern = %pattern, streams = matched.len(), "resolved streams");
    Ok(Some(matched))
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FakeLogs;

    fn active_stream(name: &str) -> StreamInfo {
        StreamInfo {
            name: name.to_string(),
            first_event_at: Some(0),
            last_event_at: Some(50),
            last_ingestion_at: Some(60),
        }
    }

    async fn seeded_fake() -> FakeLogs {
        let fake = FakeLogs::new();
        for name in ["AAA", "ABA", "ACA", "BAA"] {
            fake.add_stream("group", active_stream(name)).await;
        }
        fake
    }

    async fn collect_matches(fake: &FakeLogs, pattern: &str) -> Vec<String> {
        let compiled = StreamPattern::new(pattern).unwrap();
        match_streams(fake, "group", &compiled, TimeWindow::default())
            .try_collect()
            .await
            .unwrap()
    }

    // ── Time window ─────────────────────────────────────────────

    #[test]
    fn test_window_excludes_stream_that_went_quiet_before_start() {
        let stream = StreamInfo {
            name: "old".to_string(),
            first_event_at: Some(0),
            last_event_at: Some(1),
            last_ingestion_at: Some(1),
        };
        let window = TimeWindow::new(Some(5), Some(7));
        assert!(!window.covers(&stream));
    }

    #[test]
    fn test_window_includes_overlapping_stream() {
        let stream = StreamInfo {
            name: "busy".to_string(),
            first_event_at: Some(0),
            last_event_at: Some(6),
            last_ingestion_at: Some(6),
        };
        let window = TimeWindow::new(Some(5), Some(7));
        assert!(window.covers(&stream));
    }

    #[test]
    fn test_window_excludes_stream_created_after_end() {
        let stream = StreamInfo {
            name: "late".to_string(),
            first_event_at: Some(10),
            last_event_at: Some(12),
            last_ingestion_at: Some(12),
        };
        let window = TimeWindow::new(Some(5), Some(7));
        assert!(!window.covers(&stream));
    }

    #[test]
    fn test_window_always_includes_stream_without_activity() {
        let stream = StreamInfo {
            name: "fresh".to_string(),
            first_event_at: None,
            last_event_at: None,
            last_ingestion_at: None,
        };
        let window = TimeWindow::new(Some(5), Some(7));
        assert!(window.covers(&stream));
    }

    #[test]
    fn test_unbounded_window_includes_everything_active() {
        let window = TimeWindow::default();
        assert!(window.covers(&active_stream("any")));
    }

    // ── Pattern matching ────────────────────────────────────────

    #[tokio::test]
    async fn test_pattern_matches_from_name_start() {
        let fake = seeded_fake().await;
        assert_eq!(collect_matches(&fake, "A").await, vec!["AAA", "ABA", "ACA"]);
    }

    #[tokio::test]
    async fn test_pattern_character_class() {
        let fake = seeded_fake().await;
        assert_eq!(collect_matches(&fake, "A[AC]A").await, vec!["AAA", "ACA"]);
    }

    #[tokio::test]
    async fn test_pattern_all_wildcard_matches_everything() {
        let fake = seeded_fake().await;
        assert_eq!(
            collect_matches(&fake, ALL_WILDCARD).await,
            vec!["AAA", "ABA", "ACA", "BAA"]
        );
    }

    #[tokio::test]
    async fn test_pattern_does_not_match_mid_name() {
        let fake = seeded_fake().await;
        // BAA contains "AA" but the match is anchored to the name start.
        assert_eq!(collect_matches(&fake, "AA").await, vec!["AAA"]);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = StreamPattern::new("[unclosed").unwrap_err();
        assert!(matches!(err, CloudtailError::InvalidStreamPattern { .. }));
    }

    // ── Listing ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_listing_follows_pagination_tokens() {
        let fake = seeded_fake().await;
        fake.paginate(1).await;

        let all: Vec<StreamInfo> = streams(&fake, "group").try_collect().await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(fake.stream_calls().await, 4);
    }

    #[tokio::test]
    async fn test_each_collection_walks_a_fresh_listing() {
        let fake = seeded_fake().await;

        collect_matches(&fake, "A").await;
        collect_matches(&fake, "A").await;
        assert_eq!(fake.stream_calls().await, 2);
    }

    #[tokio::test]
    async fn test_listing_error_propagates() {
        let fake = FakeLogs::new();
        let err = streams(&fake, "missing")
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();
        assert!(matches!(err, CloudtailError::GroupNotFound(_)));
    }

    // ── Resolution ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_resolve_returns_matched_names() {
        let fake = seeded_fake().await;
        let resolved = resolve_streams(&fake, "group", "A[AC]A", TimeWindow::default())
            .await
            .unwrap();
        assert_eq!(resolved, Some(vec!["AAA".to_string(), "ACA".to_string()]));
    }

    #[tokio::test]
    async fn test_resolve_all_wildcard_skips_listing() {
        let fake = FakeLogs::new();
        let resolved = resolve_streams(&fake, "group", ALL_WILDCARD, TimeWindow::default())
            .await
            .unwrap();
        assert_eq!(resolved, None);
        assert_eq!(fake.stream_calls().await, 0);
    }

    #[tokio::test]
    async fn test_resolve_rejects_zero_matches() {
        let fake = seeded_fake().await;
        let err = resolve_streams(&fake, "group", "ZZZ", TimeWindow::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CloudtailError::NoStreamsMatched { .. }));
        assert_eq!(err.exit_code(), 7);
    }

    #[tokio::test]
    async fn test_resolve_rejects_too_many_matches() {
        let fake = FakeLogs::new();
        for i in 0..=FILTER_EVENTS_STREAMS_LIMIT {
            fake.add_stream("group", active_stream(&format!("s{i:03}"))).await;
        }

        let err = resolve_streams(&fake, "group", "s", TimeWindow::default())
            .await
            .unwrap_err();
        match err {
            CloudtailError::TooManyStreams { matched, limit, .. } => {
                assert_eq!(matched, FILTER_EVENTS_STREAMS_LIMIT + 1);
                assert_eq!(limit, FILTER_EVENTS_STREAMS_LIMIT);
            }
            other => panic!("expected TooManyStreams, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_applies_time_window() {
        let fake = FakeLogs::new();
        fake.add_stream(
            "group",
            StreamInfo {
                name: "quiet".to_string(),
                first_event_at: Some(0),
                last_event_at: Some(1),
                last_ingestion_at: Some(1),
            },
        )
        .await;
        fake.add_stream("group", active_stream("busy")).await;

        let window = TimeWindow::new(Some(5), Some(7));
        let resolved = resolve_streams(&fake, "group", ".*", window).await.unwrap();
        assert_eq!(resolved, Some(vec!["busy".to_string()]));
    }
}
