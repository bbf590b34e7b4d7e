//! Render — events to aligned terminal lines.

use chrono::{DateTime, Utc};
use owo_colors::{AnsiColors, OwoColorize};
use serde_json::Value;

use crate::client::LogEvent;
use crate::config::Config;

/// Stream column width when the search targets the whole group and no
/// stream list was resolved.
const DEFAULT_STREAM_WIDTH: usize = 10;

/// Lays events out as single lines with aligned, optionally colored
/// columns. Column widths are fixed up front: the group column fits the
/// group name, the stream column fits the widest resolved stream.
pub struct LineFormatter {
    group_width: usize,
    stream_width: usize,
    show_group: bool,
    show_stream: bool,
    show_timestamp: bool,
    show_ingestion: bool,
    color: bool,
    query: Option<String>,
}

impl LineFormatter {
    pub fn new(config: &Config, streams: Option<&[String]>) -> Self {
        let stream_width = streams
            .and_then(|names| names.iter().map(|name| name.len()).max())
            .unwrap_or(DEFAULT_STREAM_WIDTH);
        Self {
            group_width: config.log_group_name.len(),
            stream_width,
            show_group: config.output_group_enabled,
            show_stream: config.output_stream_enabled,
            show_timestamp: config.output_timestamp_enabled,
            show_ingestion: config.output_ingestion_time_enabled,
            color: config.color_enabled,
            query: config.query.clone(),
        }
    }

    /// Format one event. Fields appear in a fixed order: group, stream,
    /// event timestamp, ingestion timestamp, message.
    pub fn line(&self, event: &LogEvent) -> String {
        let mut fields: Vec<String> = Vec::with_capacity(5);
        if self.show_group {
            let padded = format!("{:<width$}", event.group, width = self.group_width);
            fields.push(self.paint(padded, AnsiColors::Green));
        }
        if self.show_stream {
            let padded = format!("{:<width$}", event.stream, width = self.stream_width);
            fields.push(self.paint(padded, AnsiColors::Cyan));
        }
        if self.show_timestamp {
            fields.push(self.paint(format_timestamp(event.timestamp), AnsiColors::Yellow));
        }
        if self.show_ingestion {
            fields.push(self.paint(format_timestamp(event.ingestion_time), AnsiColors::Blue));
        }
        fields.push(self.message(&event.message));
        fields.join(" ")
    }

    fn paint(&self, text: String, color: AnsiColors) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text
        }
    }

    fn message(&self, raw: &str) -> String {
        let trimmed = raw.trim_end();
        if let Some(query) = &self.query {
            if trimmed.starts_with('{') {
                if let Some(extracted) = query_json(trimmed, query) {
                    return extracted;
                }
            }
        }
        trimmed.to_string()
    }
}

/// Millisecond timestamp as `1970-01-01T00:00:00.000Z`. Out-of-range
/// values fall back to the raw number.
pub fn format_timestamp(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        None => ms.to_string(),
    }
}

/// Walk a dot-separated path into a JSON document. String leaves come
/// back verbatim, other values re-serialized compactly. `None` when the
/// document does not parse or the path misses, leaving the raw message
/// to be printed instead.
fn query_json(message: &str, path: &str) -> Option<String> {
    let root: Value = serde_json::from_str(message).ok()?;
    let mut cursor = &root;
    for key in path.split('.') {
        cursor = match cursor {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(match cursor {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_config() -> Config {
        Config {
            log_group_name: "AAA".to_string(),
            color_enabled: false,
            ..Config::default()
        }
    }

    fn event(stream: &str, message: &str) -> LogEvent {
        LogEvent {
            id: "1".to_string(),
            group: "AAA".to_string(),
            stream: stream.to_string(),
            message: message.to_string(),
            timestamp: 0,
            ingestion_time: 5_006,
        }
    }

    // ── Timestamps ──────────────────────────────────────────────

    #[test]
    fn test_timestamp_epoch() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_timestamp_with_milliseconds() {
        assert_eq!(format_timestamp(1_420_070_400_123), "2015-01-01T00:00:00.123Z");
    }

    // ── Layout ──────────────────────────────────────────────────

    #[test]
    fn test_default_line_is_group_stream_message() {
        let formatter = LineFormatter::new(&plain_config(), Some(&["DDD".to_string()]));
        assert_eq!(formatter.line(&event("DDD", "Hello 1")), "AAA DDD Hello 1");
    }

    #[test]
    fn test_stream_column_padded_to_widest_resolved_name() {
        let streams = vec!["web".to_string(), "web-canary".to_string()];
        let formatter = LineFormatter::new(&plain_config(), Some(&streams));
        assert_eq!(
            formatter.line(&event("web", "hi")),
            "AAA web        hi"
        );
    }

    #[test]
    fn test_stream_column_default_width_without_resolved_names() {
        let formatter = LineFormatter::new(&plain_config(), None);
        assert_eq!(formatter.line(&event("s", "hi")), "AAA s          hi");
    }

    #[test]
    fn test_timestamp_columns_in_order() {
        let config = Config {
            output_timestamp_enabled: true,
            output_ingestion_time_enabled: true,
            ..plain_config()
        };
        let formatter = LineFormatter::new(&config, Some(&["DDD".to_string()]));
        assert_eq!(
            formatter.line(&event("DDD", "Hello")),
            "AAA DDD 1970-01-01T00:00:00.000Z 1970-01-01T00:00:05.006Z Hello"
        );
    }

    #[test]
    fn test_group_and_stream_can_be_hidden() {
        let config = Config {
            output_group_enabled: false,
            output_stream_enabled: false,
            ..plain_config()
        };
        let formatter = LineFormatter::new(&config, Some(&["DDD".to_string()]));
        assert_eq!(formatter.line(&event("DDD", "Hello")), "Hello");
    }

    #[test]
    fn test_trailing_whitespace_stripped() {
        let formatter = LineFormatter::new(&plain_config(), Some(&["DDD".to_string()]));
        assert_eq!(formatter.line(&event("DDD", "Hello  \n")), "AAA DDD Hello");
    }

    #[test]
    fn test_color_wraps_padded_fields() {
        let config = Config {
            color_enabled: true,
            ..plain_config()
        };
        let formatter = LineFormatter::new(&config, Some(&["DDD".to_string()]));
        let line = formatter.line(&event("DDD", "Hello"));
        // Green group column, cyan stream column, message untouched.
        assert!(line.contains("\x1b[32mAAA"));
        assert!(line.contains("\x1b[36mDDD"));
        assert!(line.ends_with("Hello"));
    }

    // ── JSON query ──────────────────────────────────────────────

    fn query_config(query: &str) -> Config {
        Config {
            query: Some(query.to_string()),
            ..plain_config()
        }
    }

    #[test]
    fn test_query_extracts_string_verbatim() {
        let formatter = LineFormatter::new(&query_config("msg"), Some(&["DDD".to_string()]));
        let line = formatter.line(&event("DDD", r#"{"msg": "it broke", "level": 3}"#));
        assert_eq!(line, "AAA DDD it broke");
    }

    #[test]
    fn test_query_walks_nested_path() {
        let formatter =
            LineFormatter::new(&query_config("error.message"), Some(&["DDD".to_string()]));
        let line = formatter.line(&event("DDD", r#"{"error": {"message": "timeout"}}"#));
        assert_eq!(line, "AAA DDD timeout");
    }

    #[test]
    fn test_query_indexes_arrays() {
        let formatter =
            LineFormatter::new(&query_config("items.1"), Some(&["DDD".to_string()]));
        let line = formatter.line(&event("DDD", r#"{"items": ["a", "b"]}"#));
        assert_eq!(line, "AAA DDD b");
    }

    #[test]
    fn test_query_serializes_non_string_results() {
        let formatter = LineFormatter::new(&query_config("ctx"), Some(&["DDD".to_string()]));
        let line = formatter.line(&event("DDD", r#"{"ctx": {"code": 500}}"#));
        assert_eq!(line, r#"AAA DDD {"code":500}"#);
    }

    #[test]
    fn test_query_leaves_non_json_messages_alone() {
        let formatter = LineFormatter::new(&query_config("msg"), Some(&["DDD".to_string()]));
        assert_eq!(formatter.line(&event("DDD", "plain text")), "AAA DDD plain text");
    }

    #[test]
    fn test_query_leaves_broken_json_alone() {
        let formatter = LineFormatter::new(&query_config("msg"), Some(&["DDD".to_string()]));
        assert_eq!(
            formatter.line(&event("DDD", r#"{"msg": "untermin"#)),
            r#"AAA DDD {"msg": "untermin"#
        );
    }

    #[test]
    fn test_query_misses_fall_back_to_raw_message() {
        let formatter = LineFormatter::new(&query_config("absent"), Some(&["DDD".to_string()]));
        assert_eq!(
            formatter.line(&event("DDD", r#"{"msg": "hi"}"#)),
            r#"AAA DDD {"msg": "hi"}"#
        );
    }
}
