//! Command-line argument parsing.

use clap::{ArgGroup, Parser};
use promptopt_core::{GatewayConfig, OptimizerConfig};
use std::path::PathBuf;
use std::time::Duration;

use crate::config_file::FileConfig;

/// Improve a system prompt automatically against labeled examples
#[derive(Parser, Debug)]
#[command(name = "promptopt")]
#[command(about = "Prompt optimizer - improve your system prompts automatically", long_about = None)]
#[command(version)]
#[command(group(
    ArgGroup::new("initial_prompt")
        .required(true)
        .args(["prompt", "prompt_file"])
))]
pub struct Args {
    /// Path to CSV file with input and ground_truth columns
    #[arg(short, long)]
    pub input_csv: PathBuf,

    /// Initial system prompt text
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Path to file containing the initial system prompt
    #[arg(short = 'f', long)]
    pub prompt_file: Option<PathBuf>,

    /// Output file for the optimized prompt (default: print to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of optimization iterations
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Number of examples to process in each chunk
    #[arg(short, long)]
    pub chunk_size: Option<usize>,

    /// Do not shuffle the examples before optimization
    #[arg(long)]
    pub no_shuffle: bool,

    /// Seed for the deterministic example shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Model identifier to optimize with
    #[arg(long)]
    pub model: Option<String>,

    /// Temperature for generation (0.0-1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum output tokens per request
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Gateway request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum retries per gateway request
    #[arg(long)]
    pub retries: Option<u32>,

    /// Directory with valuation.md, summarization.md, rewrite.md overrides
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Path to a TOML config file with [llm] and [optimizer] sections
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// OpenAI API key (can also use OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Print verbose output during optimization
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build GatewayConfig from CLI arguments over file-config values.
    ///
    /// Precedence: flag > config file > default.
    pub fn gateway_config(&self, file: &FileConfig) -> GatewayConfig {
        let defaults = GatewayConfig::default();
        GatewayConfig {
            model: self
                .model
                .clone()
                .or_else(|| file.llm.model.clone())
                .unwrap_or(defaults.model),
            temperature: self
                .temperature
                .or(file.llm.temperature)
                .unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.or(file.llm.max_tokens),
            timeout: self
                .timeout
                .or(file.llm.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retry_attempts: self
                .retries
                .or(file.llm.retry_attempts)
                .unwrap_or(defaults.retry_attempts),
            retry_base_delay_ms: file
                .llm
                .retry_base_delay_ms
                .unwrap_or(defaults.retry_base_delay_ms),
        }
    }

    /// Build OptimizerConfig from CLI arguments over file-config values.
    pub fn optimizer_config(&self, file: &FileConfig) -> OptimizerConfig {
        let defaults = OptimizerConfig::default();
        OptimizerConfig {
            max_iterations: self
                .iterations
                .or(file.optimizer.max_iterations)
                .unwrap_or(defaults.max_iterations),
            chunk_size: self
                .chunk_size
                .or(file.optimizer.chunk_size)
                .unwrap_or(defaults.chunk_size),
            shuffle: if self.no_shuffle {
                false
            } else {
                file.optimizer.shuffle.unwrap_or(defaults.shuffle)
            },
            seed: self.seed.or(file.optimizer.seed).unwrap_or(defaults.seed),
        }
    }
}
