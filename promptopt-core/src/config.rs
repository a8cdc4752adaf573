use std::time::Duration;

/// Default model identifier for the OpenAI gateway
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for a model gateway
///
/// Constructed once per run and passed down the call chain; never mutated
/// after construction.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Model identifier sent with each request
    ///
    /// Default: `gpt-4o-mini`
    pub model: String,

    /// Temperature for generation (0.0 - 1.0)
    ///
    /// Default: 0.7
    pub temperature: f32,

    /// Maximum output tokens per request, unlimited if `None`
    ///
    /// Default: `None`
    pub max_tokens: Option<u32>,

    /// Timeout for individual gateway requests
    ///
    /// Default: 60 seconds
    pub timeout: Duration,

    /// Maximum number of retries on transient failures
    ///
    /// Default: 3
    pub retry_attempts: u32,

    /// Base delay for exponential backoff (milliseconds)
    ///
    /// Default: 1000ms (1 second)
    pub retry_base_delay_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: None,
            timeout: Duration::from_secs(60),
            retry_attempts: 3,
            retry_base_delay_ms: 1000,
        }
    }
}

impl GatewayConfig {
    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature for generation (0.0 - 1.0).
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum output tokens per request.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the timeout for individual gateway requests.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries on transient failures.
    #[must_use]
    pub fn with_retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    /// Set the base delay for exponential backoff (milliseconds).
    #[must_use]
    pub fn with_retry_base_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_base_delay_ms = delay_ms;
        self
    }

    /// Get the retry delay for a given attempt number (0-indexed)
    ///
    /// Uses exponential backoff: delay = base_delay * 2^attempt, capped at
    /// 60 seconds to prevent overflow and unreasonable waits.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        const MAX_DELAY_MS: u64 = 60_000;

        let delay_ms = self
            .retry_base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(MAX_DELAY_MS);

        Duration::from_millis(delay_ms)
    }
}

/// Configuration for the optimization loop
///
/// Immutable for the lifetime of a run. The loop always runs exactly
/// `max_iterations` times; there is no convergence check.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Number of optimization iterations
    ///
    /// Default: 1. Zero is permitted and returns the initial prompt
    /// unchanged without any gateway calls.
    pub max_iterations: usize,

    /// Number of examples valuated concurrently per chunk
    ///
    /// Default: 2. Must be at least 1.
    pub chunk_size: usize,

    /// Whether to shuffle examples on load
    ///
    /// Default: true
    pub shuffle: bool,

    /// Seed for the deterministic shuffle
    ///
    /// Default: 42
    pub seed: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1,
            chunk_size: 2,
            shuffle: true,
            seed: 42,
        }
    }
}

impl OptimizerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of optimization iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set whether to shuffle examples on load.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
