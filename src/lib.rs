pub mod api;
pub mod enhancer;
pub mod gemini;
pub mod models;
pub mod parser;
pub mod service;
pub mod storage;

pub use models::{
    EnhancedPrompt, PromptExample, PromptTemplate, PromptType, StructuredPrompt, Theme,
};
pub use service::PromptService;
