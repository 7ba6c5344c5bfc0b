//! Structuring and enhancement orchestrators.
//!
//! The only entry points the HTTP layer calls. Each operation makes a
//! single attempt against the Gemini delegate and converts any failure into
//! the corresponding heuristic result. No retries, and remote and local
//! results are never mixed; callers cannot tell which path produced the
//! output.

use tracing::{debug, warn};

use crate::enhancer;
use crate::gemini::GeminiClient;
use crate::models::{EnhancedPrompt, PromptType, StructuredPrompt};
use crate::parser;

pub struct PromptService {
    remote: Option<GeminiClient>,
}

impl PromptService {
    /// A service without a remote client always answers from the heuristics.
    pub fn new(remote: Option<GeminiClient>) -> Self {
        Self { remote }
    }

    pub async fn structure_prompt(&self, prompt: &str, prompt_type: PromptType) -> StructuredPrompt {
        if let Some(remote) = &self.remote {
            match remote.structure(prompt, prompt_type).await {
                Ok(structured) => {
                    debug!("Structured prompt via Gemini");
                    return structured;
                }
                Err(error) => {
                    warn!(error = %error, "Gemini structuring failed, using heuristic fallback");
                }
            }
        }
        parser::structure(prompt, prompt_type)
    }

    pub async fn enhance_prompt(&self, prompt: &str, prompt_type: PromptType) -> EnhancedPrompt {
        if let Some(remote) = &self.remote {
            match remote.enhance(prompt, prompt_type).await {
                Ok(enhanced) => {
                    debug!("Enhanced prompt via Gemini");
                    return enhanced;
                }
                Err(error) => {
                    warn!(error = %error, "Gemini enhancement failed, using heuristic fallback");
                }
            }
        }
        enhancer::enhance(prompt, prompt_type)
    }
}
