//! # promptopt-core
//!
//! Iterative LLM-in-the-loop system prompt optimization.
//!
//! Given a candidate system prompt and labeled (input, ground_truth)
//! examples, each iteration runs the prompt against every example, asks the
//! model to critique the mismatches, consolidates the critiques, and asks
//! the model to rewrite the prompt accordingly. The rewritten prompt feeds
//! the next iteration.
//!
//! ## Architecture
//!
//! - **Gateway seam**: everything depends on the [`ModelGateway`] trait;
//!   [`OpenAiGateway`] is the built-in backend and [`ScriptedGateway`]
//!   replays canned responses for offline runs
//! - **Chunked valuation**: examples are processed in fixed-size chunks,
//!   sequential across chunks, concurrent within a chunk with stable
//!   result ordering and fail-fast semantics
//! - **Templates as data**: the valuation, summarization, and rewrite
//!   prompts are external markdown assets, overridable per run
//!
//! ## Example
//!
//! ```no_run
//! use promptopt_core::{
//!     run_optimizer, ExampleSet, GatewayConfig, OpenAiGateway, OptimizerConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), promptopt_core::OptimizeError> {
//! let config = OptimizerConfig::default()
//!     .with_max_iterations(2)
//!     .with_chunk_size(5);
//!
//! let gateway = Arc::new(OpenAiGateway::new("api-key", GatewayConfig::default()));
//! let mut examples = ExampleSet::from_csv_path("data.csv", config.shuffle, config.seed)?;
//!
//! let optimized = run_optimizer(
//!     gateway,
//!     "You are a helpful assistant.",
//!     &mut examples,
//!     config,
//! )
//! .await?;
//! println!("{optimized}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod optimizer;
pub mod rewriter;
pub mod summarizer;
pub mod template;
pub mod valuator;

// Re-export public API
pub use config::{GatewayConfig, OptimizerConfig, DEFAULT_MODEL};
pub use dataset::{Chunks, Example, ExampleSet};
pub use error::{DataError, GatewayError, OptimizeError};
pub use gateway::{Message, ModelGateway, OpenAiGateway, Prompt, Role};
pub use mock::ScriptedGateway;
pub use optimizer::{run_optimizer, PromptOptimizer};
pub use rewriter::Rewriter;
pub use summarizer::Summarizer;
pub use template::{PromptTemplate, TemplateSet};
pub use valuator::{Critique, Valuator};
