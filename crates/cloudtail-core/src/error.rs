//! Error taxonomy and exit-code mapping.
//!
//! Single source of truth for converting a [`CloudtailError`] into the
//! process exit code and the operator-facing hint printed to stderr.

use aws_sdk_cloudwatchlogs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudtailError {
    #[error("can't connect to CloudWatch Logs: {0}")]
    Connection(String),

    #[error("unknown date format: '{0}'")]
    UnknownDateFormat(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("AWS credentials not resolved: {0}")]
    Credentials(String),

    #[error("{matched} streams match pattern '{pattern}', above the API limit of {limit}")]
    TooManyStreams {
        pattern: String,
        matched: usize,
        limit: usize,
    },

    #[error("no streams match pattern '{pattern}' in group '{group}'")]
    NoStreamsMatched { pattern: String, group: String },

    #[error("log group not found: {0}")]
    GroupNotFound(String),

    #[error("invalid stream pattern '{pattern}': {source}")]
    InvalidStreamPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("CloudWatch Logs API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("{0}")]
    Unexpected(String),
}

// Convenience type alias
pub type Result<T> = std::result::Result<T, CloudtailError>;

impl CloudtailError {
    /// Process exit code for this error.
    ///
    /// Mapping rules:
    /// - `Connection` → 2
    /// - `UnknownDateFormat` → 3
    /// - `AccessDenied` → 4
    /// - `Credentials` → 5
    /// - `TooManyStreams` → 6
    /// - `NoStreamsMatched` → 7
    /// - `GroupNotFound` → 8
    /// - Everything else → 1
    pub fn exit_code(&self) -> i32 {
        match self {
            CloudtailError::Connection(_) => 2,
            CloudtailError::UnknownDateFormat(_) => 3,
            CloudtailError::AccessDenied(_) => 4,
            CloudtailError::Credentials(_) => 5,
            CloudtailError::TooManyStreams { .. } => 6,
            CloudtailError::NoStreamsMatched { .. } => 7,
            CloudtailError::GroupNotFound(_) => 8,
            CloudtailError::InvalidStreamPattern { .. }
            | CloudtailError::Api { .. }
            | CloudtailError::Unexpected(_) => 1,
        }
    }

    /// Operator-facing hint for stderr. Kept separate from the `Display`
    /// impl so log lines stay terse while the terminal gets guidance.
    pub fn hint(&self) -> String {
        match self {
            CloudtailError::Connection(detail) => {
                format!("cloudtail can't connect to AWS: {detail}")
            }
            CloudtailError::UnknownDateFormat(text) => {
                format!("cloudtail doesn't understand '{text}' as a date.")
            }
            CloudtailError::AccessDenied(message) => message.clone(),
            CloudtailError::Credentials(detail) => format!(
                "{detail}\n\
                 Check that you have provided valid credentials in one of the following ways:\n\
                 * AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY environment variables.\n\
                 * ~/.aws/credentials, optionally with --aws-profile.\n\
                 * Instance or container role credentials.\n\
                 A region must also be set, via --aws-region, AWS_REGION or the profile."
            ),
            CloudtailError::TooManyStreams {
                pattern,
                matched,
                limit,
            } => format!(
                "The number of streams that match your pattern '{pattern}' is {matched}. \
                 The API limits filtering to {limit} streams; consider not filtering \
                 streams by pattern and filtering the resulting events instead."
            ),
            CloudtailError::NoStreamsMatched { pattern, group } => format!(
                "No streams match your pattern '{pattern}' in group '{group}' \
                 for the given time period."
            ),
            CloudtailError::GroupNotFound(group) => {
                format!("The log group '{group}' does not exist in the target region.")
            }
            CloudtailError::InvalidStreamPattern { .. }
            | CloudtailError::Api { .. }
            | CloudtailError::Unexpected(_) => self.to_string(),
        }
    }
}

/// Classify an AWS SDK failure into the cloudtail taxonomy.
///
/// Service errors carry a stable error code and are matched on it;
/// transport-level failures are classified by variant, falling back to
/// the rendered error chain where the variant alone is ambiguous.
pub(crate) fn classify_sdk_error<E, R>(group: &str, err: SdkError<E, R>) -> CloudtailError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(ctx) => {
            let code = ctx.err().code().unwrap_or("Unhandled").to_string();
            let message = ctx
                .err()
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| ctx.err().to_string());
            classify_service(group, code, message)
        }
        other @ (SdkError::TimeoutError(_) | SdkError::ResponseError(_)) => {
            CloudtailError::Connection(format!("{}", DisplayErrorContext(other)))
        }
        other @ (SdkError::DispatchFailure(_) | SdkError::ConstructionFailure(_)) => {
            classify_setup(format!("{}", DisplayErrorContext(other)))
        }
        other => CloudtailError::Unexpected(format!("{}", DisplayErrorContext(other))),
    }
}

fn classify_service(group: &str, code: String, message: String) -> CloudtailError {
    match code.as_str() {
        "ResourceNotFoundException" => CloudtailError::GroupNotFound(group.to_string()),
        "AccessDeniedException" | "AccessDenied" => CloudtailError::AccessDenied(message),
        "UnrecognizedClientException" | "InvalidSignatureException" | "ExpiredTokenException" => {
            CloudtailError::Credentials(message)
        }
        _ => CloudtailError::Api { code, message },
    }
}

/// Dispatch and construction failures mean the request never reached the
/// service: either the environment is missing credentials / a region, or
/// the endpoint is unreachable. Only the error chain text tells them apart.
fn classify_setup(chain: String) -> CloudtailError {
    let lowered = chain.to_ascii_lowercase();
    if lowered.contains("credential") || lowered.contains("region") {
        CloudtailError::Credentials(chain)
    } else {
        CloudtailError::Connection(chain)
    }
}
