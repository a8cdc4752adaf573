use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for an optimization run.
///
/// Each variant names the stage that failed; the wrapped error is the cause.
/// Nothing below the gateway's own retry boundary is swallowed: a failed
/// example fails its chunk, a failed chunk fails the iteration, and a failed
/// iteration fails the run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OptimizeError {
    /// Failed to load the example source
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// A gateway call failed while valuating an example
    #[error("Valuation failed: {0}")]
    Valuation(#[source] GatewayError),

    /// A gateway call failed while summarizing suggestions
    #[error("Summarization failed: {0}")]
    Summarization(#[source] GatewayError),

    /// A gateway call failed while rewriting the prompt
    #[error("Rewrite failed: {0}")]
    Rewrite(#[source] GatewayError),

    /// Invalid optimizer configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that can occur when loading an example source.
///
/// Schema problems (a row missing `input` or `ground_truth`) are not errors:
/// they are logged as warnings and the row is retained with an empty field.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DataError {
    /// Source path does not resolve
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the source
    #[error("Failed to read data: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the source as CSV
    #[error("Failed to parse data: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors that can occur at the model gateway boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// API returned a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No content in response
    #[error("No content in response")]
    NoContent,

    /// Failed to process the response body
    #[error("Failed to process response: {0}")]
    ResponseProcessing(String),

    /// Other gateway error
    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    /// Check if this error is retryable.
    ///
    /// Returns `true` for transient failures that may succeed on retry:
    /// timeouts, rate limits, network errors, and 5xx API responses. Retry
    /// is the gateway's responsibility; the valuator, summarizer, and
    /// rewriter never retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout(_) => true,
            GatewayError::RateLimit(_) => true,
            GatewayError::Network(_) => true,
            GatewayError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
