use super::TemplateStorage;
use crate::models::{PromptTemplate, StructuredPrompt, Theme};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Row};
use std::sync::Arc;
use tracing::warn;

// Maps to a row of the templates table. The serial position column keeps
// list order stable across upserts.
#[derive(FromRow, Debug, Clone)]
struct TemplateRow {
    id: String,
    name: String,
    prompt_type: String,
    raw_prompt: String,
    enhanced_prompt: Option<String>,
    structured_prompt: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<TemplateRow> for PromptTemplate {
    type Error = anyhow::Error;

    fn try_from(row: TemplateRow) -> Result<Self> {
        let structured_prompt: StructuredPrompt = serde_json::from_value(row.structured_prompt)
            .with_context(|| format!("Stored structured prompt for '{}' is invalid", row.id))?;
        let prompt_type =
            serde_json::from_value(serde_json::Value::String(row.prompt_type)).unwrap_or_default();
        Ok(PromptTemplate {
            id: row.id,
            name: row.name,
            prompt_type,
            raw_prompt: row.raw_prompt,
            enhanced_prompt: row.enhanced_prompt,
            structured_prompt,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL storage implementation.
#[derive(Clone)]
pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .with_context(|| {
                format!(
                    "Failed to create PostgreSQL connection pool for URL: {}",
                    database_url
                )
            })?;
        Ok(PostgresStorage {
            pool: Arc::new(pool),
        })
    }

    /// Initializes the database schema if it doesn't exist.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS templates (
                position BIGSERIAL,
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                prompt_type TEXT NOT NULL,
                raw_prompt TEXT NOT NULL,
                enhanced_prompt TEXT,
                structured_prompt JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            );
            "#,
        )
        .execute(&*self.pool)
        .await
        .context("Failed to initialize templates table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(&*self.pool)
        .await
        .context("Failed to initialize settings table")?;
        Ok(())
    }
}

#[async_trait]
impl TemplateStorage for PostgresStorage {
    async fn list_templates(&self) -> Result<Vec<PromptTemplate>> {
        let rows: Vec<TemplateRow> =
            sqlx::query_as("SELECT * FROM templates ORDER BY position")
                .fetch_all(&*self.pool)
                .await
                .context("Failed to fetch templates from database")?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match PromptTemplate::try_from(row) {
                Ok(template) => Some(template),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable template row");
                    None
                }
            })
            .collect())
    }

    async fn save_template(&self, template: &PromptTemplate) -> Result<()> {
        let structured_json = serde_json::to_value(&template.structured_prompt)
            .context("Failed to serialize structured prompt to JSON")?;

        // position is left untouched on conflict so upserts stay in place.
        sqlx::query(
            r#"
            INSERT INTO templates (id, name, prompt_type, raw_prompt, enhanced_prompt, structured_prompt, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                prompt_type = EXCLUDED.prompt_type,
                raw_prompt = EXCLUDED.raw_prompt,
                enhanced_prompt = EXCLUDED.enhanced_prompt,
                structured_prompt = EXCLUDED.structured_prompt,
                created_at = EXCLUDED.created_at;
            "#,
        )
        .bind(&template.id)
        .bind(&template.name)
        .bind(template.prompt_type.as_str())
        .bind(&template.raw_prompt)
        .bind(&template.enhanced_prompt)
        .bind(&structured_json)
        .bind(template.created_at)
        .execute(&*self.pool)
        .await
        .with_context(|| format!("Failed to save template with id '{}' to database", template.id))?;
        Ok(())
    }

    async fn delete_template(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM templates WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .with_context(|| format!("Failed to delete template with id '{}' from database", id))?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_theme(&self) -> Result<Theme> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = 'theme'")
            .fetch_optional(&*self.pool)
            .await
            .context("Failed to fetch theme from database")?;
        Ok(row
            .map(|r| Theme::from_tag(r.get::<String, _>("value").as_str()))
            .unwrap_or_default())
    }

    async fn set_theme(&self, theme: Theme) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES ('theme', $1)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value;
            "#,
        )
        .bind(theme.as_str())
        .execute(&*self.pool)
        .await
        .context("Failed to save theme to database")?;
        Ok(())
    }
}
