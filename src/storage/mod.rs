use crate::models::{PromptTemplate, Theme};
use anyhow::Result;
use async_trait::async_trait;

pub mod filesystem;
pub mod postgres;

pub use filesystem::FileSystemStorage;
pub use postgres::PostgresStorage;

/// Trait defining the interface for template storage backends.
#[async_trait]
pub trait TemplateStorage: Send + Sync + 'static {
    /// Lists all saved templates in their original insertion order.
    /// Absent or unreadable persisted data yields an empty list, not an
    /// error.
    async fn list_templates(&self) -> Result<Vec<PromptTemplate>>;

    /// Saves a template, overwriting in place when the id already exists.
    async fn save_template(&self, template: &PromptTemplate) -> Result<()>;

    /// Deletes the template with the given id.
    /// Returns true if a template was deleted, false if none matched.
    async fn delete_template(&self, id: &str) -> Result<bool>;

    /// Returns the persisted theme tag, defaulting to light.
    async fn get_theme(&self) -> Result<Theme>;

    /// Persists the theme tag.
    async fn set_theme(&self, theme: Theme) -> Result<()>;
}
