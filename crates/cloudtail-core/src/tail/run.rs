//! Run — drives the pipeline into an output sink.
//!
//! These are the three operations the binary exposes. Each emitted line
//! is flushed immediately so piping into `head` or a pager feels live,
//! and a reader hanging up ends the run cleanly instead of erroring.

use std::io::{self, Write};
use std::time::Duration;

use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::{FilterRequest, LogsOps};
use crate::config::Config;
use crate::error::{CloudtailError, Result};
use crate::tail::fetch;
use crate::tail::render::LineFormatter;
use crate::tail::resolve::{self, TimeWindow};

/// Write one line and flush. `Ok(false)` means the reader hung up and
/// the caller should stop emitting.
fn write_line(out: &mut (dyn Write + Send), line: &str) -> Result<bool> {
    match writeln!(out, "{line}").and_then(|()| out.flush()) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(err) => Err(CloudtailError::Unexpected(format!(
            "can't write to output: {err}"
        ))),
    }
}

/// Fetch and print log events per `config`, oldest first, until the
/// search drains (or forever in watch mode). Returns cleanly when
/// `cancel` fires between lines.
pub async fn list_logs(
    client: &dyn LogsOps,
    config: &Config,
    out: &mut (dyn Write + Send),
    cancel: CancellationToken,
) -> Result<()> {
    let window = TimeWindow::new(config.start, config.end);
    let streams = resolve::resolve_streams(
        client,
        &config.log_group_name,
        &config.log_stream_pattern,
        window,
    )
    .await?;

    let formatter = LineFormatter::new(config, streams.as_deref());
    let request = FilterRequest {
        group: config.log_group_name.clone(),
        streams,
        start: config.start,
        end: config.end,
        filter_pattern: config.filter_pattern.clone(),
    };
    let watch = config
        .watch
        .then(|| Duration::from_secs(config.watch_interval_secs));

    let events = fetch::events(client, request, watch);
    tokio::pin!(events);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(group = %config.log_group_name, "tail cancelled");
                return Ok(());
            }
            next = events.next() => match next {
                Some(event) => {
                    let line = formatter.line(&event?);
                    if !write_line(out, &line)? {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            },
        }
    }
}

/// Print every log group name on its own line, in discovery order.
pub async fn list_groups(
    client: &dyn LogsOps,
    prefix: Option<&str>,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let mut token: Option<String> = None;
    loop {
        let page = client.describe_groups(prefix, token.take()).await?;
        for group in page.groups {
            if !write_line(out, &group)? {
                return Ok(());
            }
        }
        match page.next_token {
            Some(next) => token = Some(next),
            None => return Ok(()),
        }
    }
}

/// Print every stream name in the group, in discovery order.
pub async fn list_streams(
    client: &dyn LogsOps,
    group: &str,
    out: &mut (dyn Write + Send),
) -> Result<()> {
    let streams = resolve::streams(client, group);
    tokio::pin!(streams);
    while let Some(stream) = streams.next().await {
        if !write_line(out, &stream?.name)? {
            return Ok(());
        }
    }
    Ok(())
}
