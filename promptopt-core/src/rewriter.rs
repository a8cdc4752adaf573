//! Prompt synthesis.

use crate::error::OptimizeError;
use crate::gateway::{ModelGateway, Prompt};
use crate::template::PromptTemplate;
use std::sync::Arc;

/// Stateless rewriting service over a model gateway.
pub struct Rewriter {
    gateway: Arc<dyn ModelGateway>,
    template: PromptTemplate,
}

impl Rewriter {
    /// Create a rewriter using the given rewrite template.
    pub fn new(gateway: Arc<dyn ModelGateway>, template: PromptTemplate) -> Self {
        Self { gateway, template }
    }

    /// Produce a revised prompt from the original and a suggestion.
    ///
    /// One gateway call; the response is returned verbatim. Fails with
    /// [`OptimizeError::Rewrite`] on gateway failure — the original prompt
    /// is never silently returned, so the controller cannot advance an
    /// iteration on a phantom no-op success.
    pub async fn rewrite(
        &self,
        original_system_prompt: &str,
        prompt_suggestion: &str,
    ) -> Result<String, OptimizeError> {
        let filled = self.template.render(&[
            ("original_system_prompt", original_system_prompt),
            ("prompt_suggestion", prompt_suggestion),
        ]);

        self.gateway
            .generate(Prompt::Text(filled))
            .await
            .map_err(OptimizeError::Rewrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::mock::ScriptedGateway;

    #[tokio::test]
    async fn test_rewrite_fills_both_placeholders() {
        let gateway = Arc::new(ScriptedGateway::new(|prompt: &Prompt| match prompt {
            Prompt::Text(text) => Ok(text.clone()),
            _ => Err(GatewayError::InvalidRequest("expected text".into())),
        }));
        let rewriter = Rewriter::new(
            gateway.clone(),
            PromptTemplate::new("old: {original_system_prompt} | fix: {prompt_suggestion}"),
        );

        let result = rewriter.rewrite("be terse", "add examples").await.unwrap();
        assert_eq!(result, "old: be terse | fix: add examples");
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rewrite_failure_wraps_stage() {
        let gateway = Arc::new(ScriptedGateway::new(|_: &Prompt| {
            Err(GatewayError::Timeout(500))
        }));
        let rewriter = Rewriter::new(gateway, PromptTemplate::new("{original_system_prompt}"));

        let result = rewriter.rewrite("p", "s").await;
        assert!(matches!(result, Err(OptimizeError::Rewrite(_))));
    }
}
