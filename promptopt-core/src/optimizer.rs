//! Optimization controller.
//!
//! Owns the iteration loop and the candidate prompt's lifecycle. Each
//! iteration streams every chunk through the valuator, reduces each chunk's
//! critiques to a suggestion, consolidates the suggestions, and rewrites the
//! prompt. Iterations and chunks are strictly sequential; only the
//! per-example gateway calls inside one chunk run concurrently.

use crate::config::OptimizerConfig;
use crate::dataset::ExampleSet;
use crate::error::OptimizeError;
use crate::gateway::ModelGateway;
use crate::rewriter::Rewriter;
use crate::summarizer::Summarizer;
use crate::template::TemplateSet;
use crate::valuator::Valuator;
use std::sync::Arc;

/// Iterative prompt optimizer.
///
/// Holds the three stateless services and the run configuration. The
/// candidate prompt is owned by the controller and passed read-only to the
/// services; each iteration produces a new prompt by reassignment.
///
/// # Example
///
/// ```no_run
/// use promptopt_core::{
///     ExampleSet, GatewayConfig, OpenAiGateway, OptimizerConfig, PromptOptimizer,
/// };
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), promptopt_core::OptimizeError> {
/// let gateway = Arc::new(OpenAiGateway::new("api-key", GatewayConfig::default()));
/// let config = OptimizerConfig::default().with_max_iterations(2);
///
/// let mut examples = ExampleSet::from_csv_path("data.csv", config.shuffle, config.seed)?;
/// let optimizer = PromptOptimizer::new(gateway, config);
///
/// let optimized = optimizer.run(&mut examples, "You are a helpful assistant.").await?;
/// println!("{optimized}");
/// # Ok(())
/// # }
/// ```
pub struct PromptOptimizer {
    valuator: Valuator,
    summarizer: Summarizer,
    rewriter: Rewriter,
    config: OptimizerConfig,
}

impl PromptOptimizer {
    /// Create an optimizer with the default template set.
    pub fn new(gateway: Arc<dyn ModelGateway>, config: OptimizerConfig) -> Self {
        Self::with_templates(gateway, config, TemplateSet::default())
    }

    /// Create an optimizer with custom templates.
    pub fn with_templates(
        gateway: Arc<dyn ModelGateway>,
        config: OptimizerConfig,
        templates: TemplateSet,
    ) -> Self {
        Self {
            valuator: Valuator::new(gateway.clone(), templates.valuation),
            summarizer: Summarizer::new(gateway.clone(), templates.summarization),
            rewriter: Rewriter::new(gateway, templates.rewrite),
            config,
        }
    }

    /// Get a reference to the run configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Run one optimization iteration against the current prompt.
    ///
    /// Rewinds the example cursor, valuates each chunk (concurrently within
    /// the chunk, sequentially across chunks), reduces each critique list to
    /// one suggestion, consolidates the suggestions, and rewrites the
    /// prompt. Any stage failure aborts the iteration.
    pub async fn optimize(
        &self,
        examples: &mut ExampleSet,
        candidate_prompt: &str,
    ) -> Result<String, OptimizeError> {
        examples.reset();
        let mut suggestions = Vec::new();

        loop {
            let chunk = examples.next_chunk(self.config.chunk_size);
            if chunk.is_empty() {
                break;
            }

            let critiques = self
                .valuator
                .valuate_chunk(chunk, candidate_prompt, None)
                .await?;
            let suggestion = self.summarizer.summarize(&critiques).await?;
            suggestions.push(suggestion);
        }

        let consolidated = self.summarizer.summarize(&suggestions).await?;
        self.rewriter.rewrite(candidate_prompt, &consolidated).await
    }

    /// Run the full optimization: exactly `max_iterations` iterations.
    ///
    /// Each iteration feeds on the previous iteration's prompt; the
    /// resulting prompt is logged after every iteration. With
    /// `max_iterations == 0` the initial prompt is returned unchanged and
    /// the gateway is never invoked. There is no quality gate and no
    /// rollback: the rewriter's output always becomes the next candidate.
    pub async fn run(
        &self,
        examples: &mut ExampleSet,
        initial_prompt: &str,
    ) -> Result<String, OptimizeError> {
        if self.config.chunk_size == 0 {
            return Err(OptimizeError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }

        let mut prompt = initial_prompt.to_string();
        for iteration in 1..=self.config.max_iterations {
            prompt = self.optimize(examples, &prompt).await?;
            log::info!(
                "Iteration {}/{} produced prompt:\n{}",
                iteration,
                self.config.max_iterations,
                prompt
            );
        }

        Ok(prompt)
    }
}

/// Run an optimization end to end.
///
/// Entry contract consumed by the CLI and server: builds a
/// [`PromptOptimizer`] over the gateway and runs it against the example set,
/// returning the final prompt text.
pub async fn run_optimizer(
    gateway: Arc<dyn ModelGateway>,
    initial_prompt: &str,
    examples: &mut ExampleSet,
    config: OptimizerConfig,
) -> Result<String, OptimizeError> {
    PromptOptimizer::new(gateway, config)
        .run(examples, initial_prompt)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Example;
    use crate::mock::ScriptedGateway;

    fn example_set(n: usize) -> ExampleSet {
        ExampleSet::from_records(
            (0..n)
                .map(|i| Example::new(format!("in-{i}"), format!("gt-{i}")))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_zero_iterations_returns_initial_prompt_without_calls() {
        let gateway = Arc::new(ScriptedGateway::fixed("unused"));
        let optimizer = PromptOptimizer::new(
            gateway.clone(),
            OptimizerConfig::default().with_max_iterations(0),
        );

        let mut examples = example_set(4);
        let result = optimizer.run(&mut examples, "initial").await.unwrap();

        assert_eq!(result, "initial");
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_rejected() {
        let gateway = Arc::new(ScriptedGateway::fixed("unused"));
        let optimizer =
            PromptOptimizer::new(gateway.clone(), OptimizerConfig::default().with_chunk_size(0));

        let mut examples = example_set(4);
        let result = optimizer.run(&mut examples, "p").await;

        assert!(matches!(result, Err(OptimizeError::InvalidConfig(_))));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_chunk_aborts_run() {
        let gateway = Arc::new(ScriptedGateway::new(|_: &crate::Prompt| {
            Err(crate::GatewayError::Timeout(100))
        }));
        let optimizer = PromptOptimizer::new(gateway, OptimizerConfig::default());

        let mut examples = example_set(4);
        let result = optimizer.run(&mut examples, "p").await;

        assert!(matches!(result, Err(OptimizeError::Valuation(_))));
    }
}
