use crate::models::{PromptTemplate, Theme};
use crate::storage::TemplateStorage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

const TEMPLATES_FILE: &str = "templates.json";
const THEME_FILE: &str = "theme.json";

/// Filesystem backend: one JSON array file holding every template in
/// insertion order, plus a theme tag file, both under `data_dir`. Single
/// active writer assumed; last write wins.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    data_dir: PathBuf,
}

impl FileSystemStorage {
    /// Creates a new FileSystemStorage instance.
    /// Ensures the data directory exists.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let path_buf = data_dir.as_ref().to_path_buf();
        // Synchronous in the constructor; async methods handle later failures.
        if let Err(e) = std::fs::create_dir_all(&path_buf) {
            error!(path = %path_buf.display(), error = %e, "Failed to create data directory during initialization");
        }
        Self { data_dir: path_buf }
    }

    fn templates_path(&self) -> PathBuf {
        self.data_dir.join(TEMPLATES_FILE)
    }

    fn theme_path(&self) -> PathBuf {
        self.data_dir.join(THEME_FILE)
    }

    async fn read_templates(&self) -> Result<Vec<PromptTemplate>> {
        let path = self.templates_path();
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read template file: {}", path.display()))
            }
        };

        match serde_json::from_str(&contents) {
            Ok(templates) => Ok(templates),
            Err(e) => {
                // Corrupt stored data is swallowed, not surfaced.
                warn!(path = %path.display(), error = %e, "Template file is not valid JSON, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn write_templates(&self, templates: &[PromptTemplate]) -> Result<()> {
        let path = self.templates_path();
        let contents = serde_json::to_string_pretty(templates)
            .context("Failed to serialize templates")?;

        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)
                .await
                .with_context(|| format!("Failed to create data directory '{}'", self.data_dir.display()))?;
        }

        let mut file = fs::File::create(&path)
            .await
            .with_context(|| format!("Failed to open template file for writing: {}", path.display()))?;
        file.write_all(contents.as_bytes())
            .await
            .with_context(|| format!("Failed to write template file: {}", path.display()))
    }
}

#[async_trait]
impl TemplateStorage for FileSystemStorage {
    async fn list_templates(&self) -> Result<Vec<PromptTemplate>> {
        self.read_templates().await
    }

    async fn save_template(&self, template: &PromptTemplate) -> Result<()> {
        let mut templates = self.read_templates().await?;
        match templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template.clone(),
            None => templates.push(template.clone()),
        }
        self.write_templates(&templates).await
    }

    async fn delete_template(&self, id: &str) -> Result<bool> {
        let templates = self.read_templates().await?;
        let before = templates.len();
        let remaining: Vec<PromptTemplate> =
            templates.into_iter().filter(|t| t.id != id).collect();
        if remaining.len() == before {
            return Ok(false);
        }
        self.write_templates(&remaining).await?;
        Ok(true)
    }

    async fn get_theme(&self) -> Result<Theme> {
        let path = self.theme_path();
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Theme::from_tag(contents.trim().trim_matches('"'))),
            Err(ref e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Theme::default()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read theme file: {}", path.display())),
        }
    }

    async fn set_theme(&self, theme: Theme) -> Result<()> {
        let path = self.theme_path();
        fs::write(&path, format!("\"{}\"", theme.as_str()))
            .await
            .with_context(|| format!("Failed to write theme file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PromptType, StructuredPrompt};
    use tempfile::TempDir;

    fn template(id: &str, name: &str) -> PromptTemplate {
        PromptTemplate {
            id: id.to_string(),
            name: name.to_string(),
            prompt_type: PromptType::General,
            raw_prompt: "Write a haiku".to_string(),
            enhanced_prompt: None,
            structured_prompt: StructuredPrompt {
                context: "You are an AI assistant".to_string(),
                task: "Write a haiku".to_string(),
                format: "Clear and organized response".to_string(),
                constraints: vec![],
                examples: vec![],
            },
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_then_list_round_trips() {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        let t = template("1", "Haiku");
        storage.save_template(&t).await.unwrap();
        let listed = storage.list_templates().await.unwrap();
        assert_eq!(listed, vec![t]);
    }

    #[tokio::test]
    async fn save_upserts_by_id() {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        let t = template("1", "Haiku");
        storage.save_template(&t).await.unwrap();
        let mut renamed = t.clone();
        renamed.name = "X".to_string();
        storage.save_template(&renamed).await.unwrap();
        let listed = storage.list_templates().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "X");
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        for (id, name) in [("1", "a"), ("2", "b"), ("3", "c")] {
            storage.save_template(&template(id, name)).await.unwrap();
        }
        // Overwriting an early entry must not move it.
        storage.save_template(&template("1", "a2")).await.unwrap();
        let names: Vec<String> = storage
            .list_templates()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a2", "b", "c"]);
    }

    #[tokio::test]
    async fn delete_removes_matching_id() {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        storage.save_template(&template("1", "a")).await.unwrap();
        assert!(storage.delete_template("1").await.unwrap());
        assert!(storage.list_templates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        storage.save_template(&template("1", "a")).await.unwrap();
        assert!(!storage.delete_template("2").await.unwrap());
        assert_eq!(storage.list_templates().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_template_file_lists_as_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        std::fs::write(dir.path().join(TEMPLATES_FILE), "not json").unwrap();
        assert!(storage.list_templates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_storage_lists_as_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        assert!(storage.list_templates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn theme_defaults_to_light_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        assert_eq!(storage.get_theme().await.unwrap(), Theme::Light);
        storage.set_theme(Theme::Dark).await.unwrap();
        assert_eq!(storage.get_theme().await.unwrap(), Theme::Dark);
    }
}
