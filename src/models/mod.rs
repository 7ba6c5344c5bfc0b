pub mod prompt;

pub use prompt::{
    EnhancedPrompt, PromptExample, PromptTemplate, PromptType, StructuredPrompt, Theme,
};
