//! Per-example critique of a candidate prompt against ground truth.
//!
//! For each example the valuator drives the gateway twice: once to produce
//! the candidate prompt's output for the example input, once to critique
//! that output against the ground truth through the valuation template.
//! Within a chunk all examples are valuated concurrently; the result order
//! matches the chunk order regardless of completion order.

use crate::dataset::Example;
use crate::error::OptimizeError;
use crate::gateway::{Message, ModelGateway, Prompt};
use crate::template::PromptTemplate;
use futures_util::future::try_join_all;
use std::sync::Arc;

/// Free-text judgment of how well a model output matched ground truth.
///
/// Opaque by design: the critique is passed downstream as-is. A structured
/// parsing stage can be introduced behind this type without touching the
/// controller's control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Critique(String);

impl Critique {
    /// Wrap critique text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The critique text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the underlying text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Critique {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Critique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stateless valuation service over a model gateway.
pub struct Valuator {
    gateway: Arc<dyn ModelGateway>,
    template: PromptTemplate,
}

impl Valuator {
    /// Create a valuator using the given critique template.
    pub fn new(gateway: Arc<dyn ModelGateway>, template: PromptTemplate) -> Self {
        Self { gateway, template }
    }

    /// Critique one example under the candidate prompt.
    ///
    /// If `precomputed_output` is absent, the gateway is first invoked with
    /// a two-turn conversation (system = candidate prompt, user = example
    /// input) to obtain the output to critique. Either gateway failure
    /// propagates as [`OptimizeError::Valuation`]; no degraded critique is
    /// synthesized.
    pub async fn valuate_one(
        &self,
        example: &Example,
        candidate_prompt: &str,
        precomputed_output: Option<String>,
    ) -> Result<Critique, OptimizeError> {
        let output = match precomputed_output {
            Some(output) => output,
            None => {
                let conversation = Prompt::Conversation(vec![
                    Message::system(candidate_prompt),
                    Message::user(&example.input),
                ]);
                self.gateway
                    .generate(conversation)
                    .await
                    .map_err(OptimizeError::Valuation)?
            }
        };

        let filled = self.template.render(&[
            ("system_prompt", candidate_prompt),
            ("input", &example.input),
            ("llm_generated_output", &output),
            ("ground_truth_output", &example.ground_truth),
        ]);

        let critique = self
            .gateway
            .generate(Prompt::Text(filled))
            .await
            .map_err(OptimizeError::Valuation)?;

        Ok(Critique::new(critique))
    }

    /// Critique every example in a chunk concurrently.
    ///
    /// `outputs`, when supplied, provides pre-computed model outputs aligned
    /// by index with the chunk. The returned critiques follow the chunk's
    /// example order. Valuation is fail-fast: the first failure fails the
    /// whole chunk, sibling calls are dropped, and no partial list is
    /// returned.
    pub async fn valuate_chunk(
        &self,
        chunk: &[Example],
        candidate_prompt: &str,
        outputs: Option<&[String]>,
    ) -> Result<Vec<Critique>, OptimizeError> {
        if chunk.is_empty() {
            return Ok(Vec::new());
        }

        try_join_all(chunk.iter().enumerate().map(|(i, example)| {
            let precomputed = outputs.and_then(|o| o.get(i)).cloned();
            self.valuate_one(example, candidate_prompt, precomputed)
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::mock::ScriptedGateway;
    use std::time::Duration;

    fn examples(n: usize) -> Vec<Example> {
        (0..n)
            .map(|i| Example::new(format!("in-{i}"), format!("gt-{i}")))
            .collect()
    }

    /// Script that answers generation calls with `output-for:<input>` and
    /// critique calls with `critique-of:<output>`.
    fn echo_script(prompt: &Prompt) -> Result<String, GatewayError> {
        match prompt {
            Prompt::Conversation(messages) => {
                Ok(format!("output-for:{}", messages[1].content))
            }
            Prompt::Text(text) => {
                let output = text
                    .lines()
                    .find_map(|l| l.strip_prefix("output-for:"))
                    .unwrap_or("?");
                Ok(format!("critique-of:{output}"))
            }
        }
    }

    /// Valuation template that puts the generated output on its own line so
    /// the echo script can find it.
    fn line_template() -> PromptTemplate {
        PromptTemplate::new("critique request\n{llm_generated_output}\nvs {ground_truth_output}")
    }

    #[tokio::test]
    async fn test_valuate_one_two_calls() {
        let gateway = Arc::new(ScriptedGateway::new(echo_script));
        let valuator = Valuator::new(gateway.clone(), line_template());

        let example = Example::new("What is 2+2?", "4");
        let critique = valuator.valuate_one(&example, "be terse", None).await.unwrap();

        assert_eq!(critique.as_str(), "critique-of:What is 2+2?");
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_valuate_one_precomputed_output_skips_generation() {
        let gateway = Arc::new(ScriptedGateway::new(echo_script));
        let valuator = Valuator::new(gateway.clone(), line_template());

        let example = Example::new("q", "a");
        let critique = valuator
            .valuate_one(&example, "p", Some("output-for:given".to_string()))
            .await
            .unwrap();

        assert_eq!(critique.as_str(), "critique-of:given");
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_valuate_one_tolerates_empty_ground_truth() {
        let gateway = Arc::new(ScriptedGateway::new(echo_script));
        let valuator = Valuator::new(gateway, line_template());

        let example = Example::new("q", "");
        let critique = valuator.valuate_one(&example, "p", None).await.unwrap();
        assert!(critique.as_str().starts_with("critique-of:"));
    }

    #[tokio::test]
    async fn test_valuate_chunk_preserves_order_under_variable_latency() {
        // Later examples answer faster; output order must still match input
        let gateway = Arc::new(ScriptedGateway::new(|prompt: &Prompt| match prompt {
            Prompt::Conversation(messages) => Ok(messages[1].content.clone()),
            Prompt::Text(text) => Ok(text.to_string()),
        }));

        struct DelayedGateway(Arc<ScriptedGateway>);

        #[async_trait::async_trait]
        impl ModelGateway for DelayedGateway {
            fn name(&self) -> &str {
                "delayed"
            }

            async fn generate(&self, prompt: Prompt) -> Result<String, GatewayError> {
                // Delay inversely proportional to the example index
                let index = match &prompt {
                    Prompt::Conversation(m) => m[1]
                        .content
                        .rsplit('-')
                        .next()
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(0),
                    Prompt::Text(_) => 0,
                };
                tokio::time::sleep(Duration::from_millis(40u64.saturating_sub(index * 10))).await;
                self.0.generate(prompt).await
            }
        }

        let delayed = Arc::new(DelayedGateway(gateway));
        let valuator = Valuator::new(
            delayed,
            PromptTemplate::new("{llm_generated_output}"),
        );

        let chunk = examples(4);
        let critiques = valuator.valuate_chunk(&chunk, "p", None).await.unwrap();

        let texts: Vec<&str> = critiques.iter().map(Critique::as_str).collect();
        assert_eq!(texts, vec!["in-0", "in-1", "in-2", "in-3"]);
    }

    #[tokio::test]
    async fn test_valuate_chunk_fails_fast_on_single_failure() {
        let gateway = Arc::new(ScriptedGateway::new(|prompt: &Prompt| match prompt {
            Prompt::Conversation(messages) if messages[1].content == "in-2" => {
                Err(GatewayError::Timeout(1000))
            }
            _ => Ok("ok".to_string()),
        }));
        let valuator = Valuator::new(gateway, line_template());

        let chunk = examples(4);
        let result = valuator.valuate_chunk(&chunk, "p", None).await;

        assert!(matches!(result, Err(OptimizeError::Valuation(_))));
    }

    #[tokio::test]
    async fn test_valuate_chunk_empty() {
        let gateway = Arc::new(ScriptedGateway::fixed("unused"));
        let valuator = Valuator::new(gateway.clone(), line_template());

        let critiques = valuator.valuate_chunk(&[], "p", None).await.unwrap();
        assert!(critiques.is_empty());
        assert_eq!(gateway.call_count(), 0);
    }

    #[test]
    fn test_critique_accessors() {
        let critique = Critique::new("text");
        assert_eq!(critique.as_str(), "text");
        assert_eq!(critique.to_string(), "text");
        assert_eq!(critique.into_inner(), "text");
    }
}
