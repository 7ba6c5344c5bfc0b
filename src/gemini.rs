//! Gemini remote delegate.
//!
//! Sends a composed instruction plus the raw prompt to the Gemini
//! `generateContent` endpoint and digs a single JSON object out of the
//! free-form text response. Any failure here (missing key, transport error,
//! no JSON object, parse error) is surfaced to the orchestrator, which falls
//! back to the local heuristics. Responses are only shape-checked, never
//! validated for content.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::Tera;
use tracing::debug;

use crate::models::{EnhancedPrompt, PromptExample, PromptType, StructuredPrompt};

const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const DEFAULT_ENHANCE_SCORE: u8 = 75;

const STRUCTURE_INSTRUCTION: &str = r#"You are an expert prompt engineer. Analyze the following prompt and extract its components into a structured JSON format.

Prompt: "{{ prompt }}"
Type: {{ prompt_type }}

Extract and organize the prompt into the following JSON structure:
{
  "context": "Background or role definition (e.g., 'You are an expert developer')",
  "task": "Main objective or request (what the user wants accomplished)",
  "format": "Output format requirements (e.g., 'bullet points', 'JSON', 'step-by-step')",
  "constraints": ["Array of limitations or requirements"],
  "examples": [
    {
      "input": "Example input if provided",
      "output": "Expected output if provided"
    }
  ]
}

Rules:
- Extract actual content from the prompt, don't make up information
- If a section is not present in the prompt, provide a reasonable default based on the prompt type
- Constraints should be specific limitations mentioned in the prompt
- Examples should only be included if explicitly provided in the prompt
- Keep the extracted content concise but complete

Respond only with valid JSON.
"#;

const ENHANCE_INSTRUCTION: &str = r#"You are an expert prompt engineer. Your task is to enhance the following prompt to make it more effective and structured.

Original prompt: "{{ prompt }}"
Prompt type: {{ prompt_type }}

Please enhance this prompt by:
1. Adding appropriate role/context if missing
2. Making the task more specific and clear
3. Adding format specifications
4. Including helpful constraints
5. Adding examples if beneficial

Provide your response in the following JSON format:
{
  "enhanced": "The improved prompt text",
  "improvements": ["List of specific improvements made"],
  "score": 85
}

The score should be between 0-100 based on how much the prompt was improved.
Make sure the enhanced prompt is professional, clear, and follows prompt engineering best practices.
"#;

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// Client for the Gemini generative-text API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    instructions: Tera,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let mut instructions = Tera::default();
        instructions
            .add_raw_templates(vec![
                ("structure", STRUCTURE_INSTRUCTION),
                ("enhance", ENHANCE_INSTRUCTION),
            ])
            .context("Failed to register instruction templates")?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url: GEMINI_API_BASE_URL.to_string(),
            instructions,
        })
    }

    fn render_instruction(&self, name: &str, prompt: &str, prompt_type: PromptType) -> Result<String> {
        let mut ctx = tera::Context::new();
        ctx.insert("prompt", prompt);
        ctx.insert("prompt_type", prompt_type.as_str());
        self.instructions
            .render(name, &ctx)
            .with_context(|| format!("Failed to render '{}' instruction", name))
    }

    /// One non-streaming generateContent call; returns the concatenated text
    /// of the first candidate.
    async fn generate(&self, instruction: String) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![Part { text: instruction }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Gemini request failed")?
            .error_for_status()
            .context("Gemini returned an error status")?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to decode Gemini response body")?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(anyhow!("Gemini response contained no text"));
        }
        debug!(chars = text.len(), "Received Gemini response");
        Ok(text)
    }

    /// Asks the model to decompose `prompt`; missing or invalid fields in
    /// the returned JSON fall back to the same defaults the heuristic
    /// extractor uses.
    pub async fn structure(&self, prompt: &str, prompt_type: PromptType) -> Result<StructuredPrompt> {
        let instruction = self.render_instruction("structure", prompt, prompt_type)?;
        let text = self.generate(instruction).await?;
        parse_structured_response(&text, prompt, prompt_type)
    }

    /// Asks the model to rewrite `prompt`; `score` defaults to 75 and
    /// `improvements` to empty when absent.
    pub async fn enhance(&self, prompt: &str, prompt_type: PromptType) -> Result<EnhancedPrompt> {
        let instruction = self.render_instruction("enhance", prompt, prompt_type)?;
        let text = self.generate(instruction).await?;
        parse_enhanced_response(&text, prompt)
    }
}

/// Locates the single JSON object embedded in free-form model output: the
/// span from the first `{` through the last `}`.
fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_structured_response(
    text: &str,
    prompt: &str,
    prompt_type: PromptType,
) -> Result<StructuredPrompt> {
    let span = extract_json_span(text).context("No JSON object in model response")?;
    let value: Value =
        serde_json::from_str(span).context("Model response is not valid JSON")?;

    let constraints = value
        .get("constraints")
        .cloned()
        .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
        .unwrap_or_default();
    let examples = value
        .get("examples")
        .cloned()
        .and_then(|v| serde_json::from_value::<Vec<PromptExample>>(v).ok())
        .unwrap_or_default();

    Ok(StructuredPrompt {
        context: string_field(&value, "context")
            .unwrap_or_else(|| prompt_type.default_context().to_string()),
        task: string_field(&value, "task").unwrap_or_else(|| prompt.trim().to_string()),
        format: string_field(&value, "format")
            .unwrap_or_else(|| prompt_type.default_format().to_string()),
        constraints,
        examples,
    })
}

fn parse_enhanced_response(text: &str, prompt: &str) -> Result<EnhancedPrompt> {
    let span = extract_json_span(text).context("No JSON object in model response")?;
    let value: Value =
        serde_json::from_str(span).context("Model response is not valid JSON")?;

    let enhanced =
        string_field(&value, "enhanced").context("Model response is missing enhanced text")?;
    let improvements = value
        .get("improvements")
        .cloned()
        .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
        .unwrap_or_default();
    let score = value
        .get("score")
        .and_then(Value::as_u64)
        .map(|s| s.min(100) as u8)
        .unwrap_or(DEFAULT_ENHANCE_SCORE);

    Ok(EnhancedPrompt {
        original: prompt.to_string(),
        enhanced,
        improvements,
        score,
    })
}
