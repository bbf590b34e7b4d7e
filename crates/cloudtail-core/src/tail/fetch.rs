//! Fetch — the paginated event search, optionally polling forever.

use std::time::Duration;

use futures_util::stream::Stream;
use tracing::debug;

use crate::client::{FilterRequest, LogEvent, LogsOps};
use crate::error::Result;
use crate::tail::dedup::DedupWindow;
use crate::tail::MAX_EVENTS_PER_CALL;

/// Stream the events matching `request`, oldest page first.
///
/// Pages are chained through continuation tokens until the server stops
/// returning one. Without `watch` the stream then ends. With `watch` it
/// sleeps for the interval and re-runs the search from the top; the
/// dedup window makes sure only events not yet emitted come out.
pub fn events<'a>(
    client: &'a dyn LogsOps,
    request: FilterRequest,
    watch: Option<Duration>,
) -> impl Stream<Item = Result<LogEvent>> + 'a {
    async_stream::try_stream! {
        let mut window = DedupWindow::new(MAX_EVENTS_PER_CALL);
        let mut token: Option<String> = None;
        loop {
            let page = client.filter_events(&request, token.take()).await?;
            let total = page.events.len();
            let mut fresh = 0usize;
            for event in page.events {
                if window.admit(&event.id) {
                    fresh += 1;
                    yield event;
                }
            }
            debug!(
                group = %request.group,
                total,
                fresh,
                more = page.next_token.is_some(),
                "event page"
            );
            match page.next_token {
                Some(next) => token = Some(next),
                None => match watch {
                    Some(interval) => tokio::time::sleep(interval).await,
                    None => break,
                },
            }
        }
    }
}
