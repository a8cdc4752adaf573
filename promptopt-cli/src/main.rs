//! promptopt CLI - optimize a system prompt against labeled examples.

mod cli;
mod config_file;

use anyhow::{Context, Result};
use clap::Parser;
use config_file::FileConfig;
use promptopt_core::{run_optimizer, ExampleSet, OpenAiGateway, PromptOptimizer, TemplateSet};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let file_config = FileConfig::load(args.config.as_deref())?;
    let gateway_config = args.gateway_config(&file_config);
    let optimizer_config = args.optimizer_config(&file_config);

    // Get the initial prompt
    let initial_prompt = match (&args.prompt, &args.prompt_file) {
        (Some(prompt), _) => prompt.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file {}", path.display()))?
            .trim()
            .to_string(),
        (None, None) => unreachable!("clap enforces the prompt group"),
    };

    let mut examples = ExampleSet::from_csv_path(
        &args.input_csv,
        optimizer_config.shuffle,
        optimizer_config.seed,
    )
    .with_context(|| format!("Failed to load examples from {}", args.input_csv.display()))?;

    if args.verbose {
        println!(
            "Starting prompt optimization: {} examples, {} iteration(s), chunk size {}",
            examples.len(),
            optimizer_config.max_iterations,
            optimizer_config.chunk_size
        );
    }

    let gateway = Arc::new(OpenAiGateway::new(args.api_key.clone(), gateway_config));

    let optimized_prompt = match &args.templates {
        Some(dir) => {
            let templates = TemplateSet::from_dir(dir)
                .with_context(|| format!("Failed to load templates from {}", dir.display()))?;
            PromptOptimizer::with_templates(gateway, optimizer_config, templates)
                .run(&mut examples, &initial_prompt)
                .await
        }
        None => run_optimizer(gateway, &initial_prompt, &mut examples, optimizer_config).await,
    }
    .context("Optimization failed")?;

    // Output the result
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory {}", parent.display())
                    })?;
                }
            }
            std::fs::write(path, &optimized_prompt)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if args.verbose {
                println!("Optimized prompt saved to: {}", path.display());
            }
        }
        None => {
            println!("\nOptimized Prompt:\n{}", "=".repeat(50));
            println!("{optimized_prompt}");
            println!("{}", "=".repeat(50));
        }
    }

    Ok(())
}
