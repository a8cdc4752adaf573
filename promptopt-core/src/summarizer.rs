//! Critique aggregation.
//!
//! One summarization primitive serves both reduction steps: collapsing a
//! chunk's critiques into one suggestion, and collapsing an iteration's
//! per-chunk suggestions into the consolidated suggestion handed to the
//! rewriter. The aggregation judgment is delegated entirely to the model;
//! there is no truncation, dedup, or scoring here.

use crate::error::OptimizeError;
use crate::gateway::{ModelGateway, Prompt};
use crate::template::PromptTemplate;
use std::sync::Arc;

/// Stateless summarization service over a model gateway.
pub struct Summarizer {
    gateway: Arc<dyn ModelGateway>,
    template: PromptTemplate,
}

impl Summarizer {
    /// Create a summarizer using the given aggregation template.
    pub fn new(gateway: Arc<dyn ModelGateway>, template: PromptTemplate) -> Self {
        Self { gateway, template }
    }

    /// Reduce a collection of suggestion texts to one.
    ///
    /// The items are joined into a numbered list, substituted into the
    /// `{suggestions}` placeholder, and sent as one gateway call whose
    /// response is returned verbatim. Fails with
    /// [`OptimizeError::Summarization`] if the call fails; retry is the
    /// gateway's responsibility, not this layer's.
    pub async fn summarize<S: AsRef<str>>(&self, items: &[S]) -> Result<String, OptimizeError> {
        let joined = items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item.as_ref()))
            .collect::<Vec<_>>()
            .join("\n\n");

        let filled = self.template.render(&[("suggestions", &joined)]);

        self.gateway
            .generate(Prompt::Text(filled))
            .await
            .map_err(OptimizeError::Summarization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::mock::ScriptedGateway;

    #[tokio::test]
    async fn test_summarize_fills_template_with_numbered_list() {
        let gateway = Arc::new(ScriptedGateway::new(|prompt: &Prompt| match prompt {
            Prompt::Text(text) => Ok(text.clone()),
            _ => Err(GatewayError::InvalidRequest("expected text".into())),
        }));
        let summarizer = Summarizer::new(gateway.clone(), PromptTemplate::new("S:\n{suggestions}"));

        let result = summarizer
            .summarize(&["tighten tone", "add date format"])
            .await
            .unwrap();

        assert_eq!(result, "S:\n1. tighten tone\n\n2. add date format");
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_summarize_returns_response_verbatim() {
        let gateway = Arc::new(ScriptedGateway::fixed("  consolidated  "));
        let summarizer = Summarizer::new(gateway, PromptTemplate::new("{suggestions}"));

        let result = summarizer.summarize(&["a"]).await.unwrap();
        assert_eq!(result, "  consolidated  ");
    }

    #[tokio::test]
    async fn test_summarize_failure_wraps_stage() {
        let gateway = Arc::new(ScriptedGateway::new(|_: &Prompt| {
            Err(GatewayError::RateLimit("quota".into()))
        }));
        let summarizer = Summarizer::new(gateway, PromptTemplate::new("{suggestions}"));

        let result = summarizer.summarize(&["a"]).await;
        assert!(matches!(result, Err(OptimizeError::Summarization(_))));
    }
}
