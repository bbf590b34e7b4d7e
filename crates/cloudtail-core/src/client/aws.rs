//! AWS — the live CloudWatch Logs client.
//!
//! A thin wrapper over the official SDK. Region, profile and retry
//! policy are resolved once in [`CloudWatchClient::connect`]; each trait
//! method is a single API call with failures folded into the
//! [`CloudtailError`](crate::error::CloudtailError) taxonomy.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use tracing::{debug, warn};

use crate::client::{
    EventPage, FilterRequest, GroupPage, LogEvent, LogsOps, StreamInfo, StreamPage,
};
use crate::error::{classify_sdk_error, Result};

/// Attempts the SDK makes on transient failures before giving up.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Live CloudWatch Logs client.
pub struct CloudWatchClient {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl CloudWatchClient {
    /// Resolve AWS configuration and build a client.
    ///
    /// `region` and `profile` override the environment / config-file
    /// chain when given; otherwise the SDK's default resolution applies.
    /// Missing credentials are not an error here: they surface on the
    /// first request, where they are classified properly.
    pub async fn connect(region: Option<String>, profile: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(MAX_RETRY_ATTEMPTS));
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(profile) = &profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        debug!(region = ?config.region(), "cloudwatch logs client ready");
        Self {
            client: aws_sdk_cloudwatchlogs::Client::new(&config),
        }
    }
}

#[async_trait]
impl LogsOps for CloudWatchClient {
    async fn describe_groups(
        &self,
        prefix: Option<&str>,
        token: Option<String>,
    ) -> Result<GroupPage> {
        let mut call = self.client.describe_log_groups();
        if let Some(prefix) = prefix {
            call = call.log_group_name_prefix(prefix);
        }
        if let Some(token) = token {
            call = call.next_token(token);
        }
        // The subject is only quoted in not-found hints; for a group
        // listing the prefix is the closest thing to one.
        let response = call
            .send()
            .await
            .map_err(|err| classify_sdk_error(prefix.unwrap_or("*"), err))?;

        let groups = response
            .log_groups
            .unwrap_or_default()
            .into_iter()
            .filter_map(|group| group.log_group_name)
            .collect();
        Ok(GroupPage {
            groups,
            next_token: response.next_token,
        })
    }

    async fn describe_streams(&self, group: &str, token: Option<String>) -> Result<StreamPage> {
        let mut call = self.client.describe_log_streams().log_group_name(group);
        if let Some(token) = token {
            call = call.next_token(token);
        }
        let response = call
            .send()
            .await
            .map_err(|err| classify_sdk_error(group, err))?;

        let streams = response
            .log_streams
            .unwrap_or_default()
            .into_iter()
            .filter_map(|stream| {
                let name = stream.log_stream_name?;
                Some(StreamInfo {
                    name,
                    first_event_at: stream.first_event_timestamp,
                    last_event_at: stream.last_event_timestamp,
                    last_ingestion_at: stream.last_ingestion_time,
                })
            })
            .collect();
        Ok(StreamPage {
            streams,
            next_token: response.next_token,
        })
    }

    async fn filter_events(
        &self,
        request: &FilterRequest,
        token: Option<String>,
    ) -> Result<EventPage> {
        let response = self
            .client
            .filter_log_events()
            .log_group_name(&request.group)
            .set_log_stream_names(request.streams.clone())
            .set_start_time(request.start)
            .set_end_time(request.end)
            .set_filter_pattern(request.filter_pattern.clone())
            .set_next_token(token)
            .send()
            .await
            .map_err(|err| classify_sdk_error(&request.group, err))?;

        let mut events = Vec::new();
        for raw in response.events.unwrap_or_default() {
            // An event without an id cannot be deduplicated across watch
            // polls; drop it rather than risk printing it twice.
            let Some(id) = raw.event_id else {
                warn!(group = %request.group, "event arrived without an id, skipping");
                continue;
            };
            events.push(LogEvent {
                id,
                group: request.group.clone(),
                stream: raw.log_stream_name.unwrap_or_default(),
                message: raw.message.unwrap_or_default(),
                timestamp: raw.timestamp.unwrap_or_default(),
                ingestion_time: raw.ingestion_time.unwrap_or_default(),
            });
        }
        Ok(EventPage {
            events,
            next_token: response.next_token,
        })
    }
}
