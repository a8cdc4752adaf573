//! Scripted gateway for offline runs and tests.
//!
//! [`ScriptedGateway`] answers every call from a caller-supplied script
//! instead of a network backend, enabling:
//!
//! - **Offline testing**: run the optimizer without API calls
//! - **Deterministic testing**: fixed responses for reproducible assertions
//! - **Call accounting**: an atomic counter of gateway invocations
//!
//! # Example
//!
//! ```
//! use promptopt_core::{ModelGateway, Prompt, ScriptedGateway};
//!
//! # async fn example() -> Result<(), promptopt_core::GatewayError> {
//! let gateway = ScriptedGateway::fixed("canned response");
//! let text = gateway.generate(Prompt::from("anything")).await?;
//! assert_eq!(text, "canned response");
//! assert_eq!(gateway.call_count(), 1);
//! # Ok(())
//! # }
//! ```

use crate::error::GatewayError;
use crate::gateway::{ModelGateway, Prompt};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

type Script = dyn Fn(&Prompt) -> Result<String, GatewayError> + Send + Sync;

/// Gateway that answers from a script instead of a model.
pub struct ScriptedGateway {
    script: Box<Script>,
    calls: AtomicUsize,
}

impl std::fmt::Debug for ScriptedGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedGateway")
            .field("calls", &self.call_count())
            .field("script", &"<function>")
            .finish()
    }
}

impl ScriptedGateway {
    /// Create a gateway driven by the given script.
    ///
    /// The script receives each prompt and decides the response; returning
    /// an error simulates a gateway failure after its retry budget.
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&Prompt) -> Result<String, GatewayError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a gateway that returns the same response for every call.
    pub fn fixed(response: impl Into<String>) -> Self {
        let response = response.into();
        Self::new(move |_| Ok(response.clone()))
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reset the call counter to zero.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: Prompt) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(&prompt)
    }
}
