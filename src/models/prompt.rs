use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The category a prompt belongs to. Drives which default-context,
/// default-format and default-role constants are used when extraction or
/// enhancement needs to fill a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptType {
    #[default]
    General,
    Chatbot,
    Coding,
    ImageGeneration,
    ContentWriting,
    DataAnalysis,
}

impl PromptType {
    /// The kebab-case tag used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptType::General => "general",
            PromptType::Chatbot => "chatbot",
            PromptType::Coding => "coding",
            PromptType::ImageGeneration => "image-generation",
            PromptType::ContentWriting => "content-writing",
            PromptType::DataAnalysis => "data-analysis",
        }
    }

    /// Context substituted when no role declaration is found in the prompt.
    pub fn default_context(&self) -> &'static str {
        match self {
            PromptType::Chatbot => "You are a helpful AI assistant",
            PromptType::Coding => "You are an expert software developer",
            PromptType::ImageGeneration => "You are a creative AI image generator",
            PromptType::ContentWriting => "You are a professional content writer",
            PromptType::DataAnalysis => "You are a data analysis expert",
            PromptType::General => "You are an AI assistant",
        }
    }

    /// Format substituted when the prompt contains no explicit format cue.
    pub fn default_format(&self) -> &'static str {
        match self {
            PromptType::Chatbot => "Conversational response",
            PromptType::Coding => "Code with explanations",
            PromptType::ImageGeneration => "Detailed image description",
            PromptType::ContentWriting => "Well-structured content",
            PromptType::DataAnalysis => "Analytical report with insights",
            PromptType::General => "Clear and organized response",
        }
    }

    /// Role sentence the enhancer prepends when the prompt declares no role.
    pub fn default_role(&self) -> &'static str {
        match self {
            PromptType::Chatbot => "You are a helpful and knowledgeable AI assistant.",
            PromptType::Coding => {
                "You are an expert software developer with extensive programming knowledge."
            }
            PromptType::ImageGeneration => {
                "You are a creative AI specialized in generating detailed image descriptions."
            }
            PromptType::ContentWriting => {
                "You are a professional content writer with expertise in creating engaging content."
            }
            PromptType::DataAnalysis => {
                "You are a data analysis expert skilled in interpreting and presenting insights."
            }
            PromptType::General => "You are a knowledgeable AI assistant.",
        }
    }

    /// Verb inserted by the enhancer when the prompt has no action verb.
    pub fn default_action_verb(&self) -> &'static str {
        match self {
            PromptType::Chatbot => "Provide",
            PromptType::Coding => "Develop",
            PromptType::ImageGeneration => "Generate",
            PromptType::ContentWriting => "Write",
            PromptType::DataAnalysis => "Analyze",
            PromptType::General => "Create",
        }
    }

    /// Sentence appended by the enhancer when the prompt specifies no format.
    pub fn format_suggestion(&self) -> &'static str {
        match self {
            PromptType::Chatbot => {
                "Provide your response in a clear, conversational format with numbered points where appropriate."
            }
            PromptType::Coding => "Include code examples with explanations and comments.",
            PromptType::ImageGeneration => {
                "Provide detailed descriptions with specific visual elements, colors, and composition."
            }
            PromptType::ContentWriting => {
                "Structure your content with clear headings, subheadings, and well-organized paragraphs."
            }
            PromptType::DataAnalysis => {
                "Present findings with clear insights, supporting data, and actionable recommendations."
            }
            PromptType::General => "Organize your response in a clear, structured format.",
        }
    }
}

/// One worked example attached to a structured prompt.
///
/// The heuristic extractor cannot split an example block into a real
/// input/output pair, so it stores the whole block as `output` with a fixed
/// placeholder `input`. Known limitation, kept for parity with the remote
/// path's schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptExample {
    pub input: String,
    pub output: String,
}

/// A free-text prompt decomposed into its components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPrompt {
    pub context: String,
    pub task: String,
    pub format: String,
    pub constraints: Vec<String>,
    pub examples: Vec<PromptExample>,
}

/// A rewritten prompt plus the change log and a quality score in [0, 100].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedPrompt {
    pub original: String,
    pub enhanced: String,
    pub improvements: Vec<String>,
    pub score: u8,
}

/// A named, persisted snapshot of a raw prompt, its type and its structured
/// result. Identity is the time-derived `id`; saving an existing id
/// overwrites the stored entry in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub prompt_type: PromptType,
    pub raw_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_prompt: Option<String>,
    pub structured_prompt: StructuredPrompt,
    pub created_at: DateTime<Utc>,
}

impl PromptTemplate {
    /// Creates a template with a millisecond-timestamp id and the current
    /// time as `created_at`.
    pub fn new(
        name: String,
        prompt_type: PromptType,
        raw_prompt: String,
        structured_prompt: StructuredPrompt,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis().to_string(),
            name,
            prompt_type,
            raw_prompt,
            enhanced_prompt: None,
            structured_prompt,
            created_at: now,
        }
    }
}

/// UI theme tag persisted alongside the templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parses a persisted theme tag; anything unrecognized falls back to
    /// the light default.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_type_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&PromptType::ImageGeneration).unwrap(),
            "\"image-generation\""
        );
        let ty: PromptType = serde_json::from_str("\"content-writing\"").unwrap();
        assert_eq!(ty, PromptType::ContentWriting);
    }

    #[test]
    fn template_wire_format_uses_camel_case() {
        let template = PromptTemplate::new(
            "Ideas".to_string(),
            PromptType::General,
            "Create app ideas".to_string(),
            StructuredPrompt {
                context: "You are an AI assistant".to_string(),
                task: "Create app ideas".to_string(),
                format: "Clear and organized response".to_string(),
                constraints: vec![],
                examples: vec![],
            },
        );
        let json = serde_json::to_value(&template).unwrap();
        assert!(json.get("rawPrompt").is_some());
        assert!(json.get("structuredPrompt").is_some());
        assert_eq!(json["type"], "general");
        // An unset enhanced prompt stays off the wire.
        assert!(json.get("enhancedPrompt").is_none());
    }

    #[test]
    fn theme_defaults_to_light() {
        assert_eq!(Theme::default(), Theme::Light);
    }
}
