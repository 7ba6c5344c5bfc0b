//! HTTP surface over the orchestrators and the template store.

use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::models::{PromptTemplate, PromptType, StructuredPrompt, Theme};
use crate::service::PromptService;
use crate::storage::TemplateStorage;

pub struct AppState {
    pub service: PromptService,
    pub storage: Arc<dyn TemplateStorage>,
}

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    #[serde(rename = "type", default)]
    pub prompt_type: PromptType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTemplateRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub prompt_type: PromptType,
    pub raw_prompt: String,
    #[serde(default)]
    pub enhanced_prompt: Option<String>,
    /// When absent the server structures the raw prompt itself.
    #[serde(default)]
    pub structured_prompt: Option<StructuredPrompt>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn storage_error(e: anyhow::Error) -> HttpResponse {
    error!(error = %e, "Storage operation failed");
    HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
}

pub async fn structure_prompt(
    state: web::Data<AppState>,
    body: web::Json<PromptRequest>,
) -> impl Responder {
    let structured = state
        .service
        .structure_prompt(&body.prompt, body.prompt_type)
        .await;
    HttpResponse::Ok().json(structured)
}

pub async fn enhance_prompt(
    state: web::Data<AppState>,
    body: web::Json<PromptRequest>,
) -> impl Responder {
    let enhanced = state
        .service
        .enhance_prompt(&body.prompt, body.prompt_type)
        .await;
    HttpResponse::Ok().json(enhanced)
}

pub async fn list_templates(state: web::Data<AppState>) -> impl Responder {
    match state.storage.list_templates().await {
        Ok(templates) => HttpResponse::Ok().json(templates),
        Err(e) => storage_error(e),
    }
}

pub async fn save_template(
    state: web::Data<AppState>,
    body: web::Json<SaveTemplateRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let structured_prompt = match request.structured_prompt {
        Some(structured) => structured,
        None => {
            state
                .service
                .structure_prompt(&request.raw_prompt, request.prompt_type)
                .await
        }
    };

    let now = Utc::now();
    let template = PromptTemplate {
        id: request.id.unwrap_or_else(|| now.timestamp_millis().to_string()),
        name: request.name,
        prompt_type: request.prompt_type,
        raw_prompt: request.raw_prompt,
        enhanced_prompt: request.enhanced_prompt,
        structured_prompt,
        created_at: request.created_at.unwrap_or(now),
    };

    match state.storage.save_template(&template).await {
        Ok(()) => HttpResponse::Ok().json(template),
        Err(e) => storage_error(e),
    }
}

pub async fn delete_template(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    match state.storage.delete_template(&id).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => {
            HttpResponse::NotFound().json(json!({ "error": format!("Template '{}' not found", id) }))
        }
        Err(e) => storage_error(e),
    }
}

/// Serves a template's structured prompt as an indented JSON download,
/// matching the browser tool's exported file.
pub async fn export_template(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();
    let templates = match state.storage.list_templates().await {
        Ok(templates) => templates,
        Err(e) => return storage_error(e),
    };
    let Some(template) = templates.into_iter().find(|t| t.id == id) else {
        return HttpResponse::NotFound()
            .json(json!({ "error": format!("Template '{}' not found", id) }));
    };
    match serde_json::to_string_pretty(&template.structured_prompt) {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header((
                "Content-Disposition",
                "attachment; filename=\"structured-prompt.json\"",
            ))
            .body(body),
        Err(e) => storage_error(e.into()),
    }
}

pub async fn get_theme(state: web::Data<AppState>) -> impl Responder {
    match state.storage.get_theme().await {
        Ok(theme) => HttpResponse::Ok().json(theme),
        Err(e) => storage_error(e),
    }
}

pub async fn set_theme(state: web::Data<AppState>, body: web::Json<Theme>) -> impl Responder {
    match state.storage.set_theme(body.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => storage_error(e),
    }
}

/// Mounts every route on the given service config; shared between the
/// binary and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/prompts/structure", web::post().to(structure_prompt))
        .route("/prompts/enhance", web::post().to(enhance_prompt))
        .route("/templates", web::get().to(list_templates))
        .route("/templates", web::post().to(save_template))
        .route("/templates/{id}", web::delete().to(delete_template))
        .route("/templates/{id}/export", web::get().to(export_template))
        .route("/settings/theme", web::get().to(get_theme))
        .route("/settings/theme", web::put().to(set_theme));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use tempfile::TempDir;

    use crate::storage::FileSystemStorage;

    fn state(dir: &TempDir) -> web::Data<AppState> {
        web::Data::new(AppState {
            service: PromptService::new(None),
            storage: Arc::new(FileSystemStorage::new(dir.path())),
        })
    }

    #[actix_web::test]
    async fn structure_endpoint_returns_structured_prompt() {
        let dir = TempDir::new().unwrap();
        let app =
            test::init_service(App::new().app_data(state(&dir)).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/prompts/structure")
            .set_json(json!({
                "prompt": "You are an expert developer. Write Python code. Keep it under 50 words.",
                "type": "general"
            }))
            .to_request();
        let body: StructuredPrompt = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.context, "expert developer");
        assert!(body.constraints.iter().any(|c| c.contains("under 50 words")));
    }

    #[actix_web::test]
    async fn enhance_endpoint_scores_heuristically() {
        let dir = TempDir::new().unwrap();
        let app =
            test::init_service(App::new().app_data(state(&dir)).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/prompts/enhance")
            .set_json(json!({ "prompt": "Create app ideas for smart home dashboard" }))
            .to_request();
        let body: crate::models::EnhancedPrompt = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.score, 85);
    }

    #[actix_web::test]
    async fn template_save_list_delete_cycle() {
        let dir = TempDir::new().unwrap();
        let app =
            test::init_service(App::new().app_data(state(&dir)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/templates")
            .set_json(json!({
                "name": "Haiku",
                "type": "content-writing",
                "rawPrompt": "Write a haiku about autumn"
            }))
            .to_request();
        let saved: PromptTemplate = test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved.name, "Haiku");
        // Server-side structuring filled the record from the raw prompt.
        assert_eq!(saved.structured_prompt.task, "Write a haiku about autumn");

        let req = test::TestRequest::get().uri("/templates").to_request();
        let listed: Vec<PromptTemplate> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/templates/{}", saved.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

        let req = test::TestRequest::delete()
            .uri(&format!("/templates/{}", saved.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn export_sets_attachment_disposition() {
        let dir = TempDir::new().unwrap();
        let app =
            test::init_service(App::new().app_data(state(&dir)).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/templates")
            .set_json(json!({ "name": "T", "rawPrompt": "Write a haiku" }))
            .to_request();
        let saved: PromptTemplate = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/templates/{}/export", saved.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let disposition = resp
            .headers()
            .get("Content-Disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("structured-prompt.json"));
        let body = test::read_body(resp).await;
        // Two-space indentation, the browser tool's export format.
        assert!(std::str::from_utf8(&body).unwrap().contains("\n  \"context\""));
    }

    #[actix_web::test]
    async fn theme_round_trips_over_http() {
        let dir = TempDir::new().unwrap();
        let app =
            test::init_service(App::new().app_data(state(&dir)).configure(configure)).await;

        let req = test::TestRequest::get().uri("/settings/theme").to_request();
        let theme: Theme = test::call_and_read_body_json(&app, req).await;
        assert_eq!(theme, Theme::Light);

        let req = test::TestRequest::put()
            .uri("/settings/theme")
            .set_json(json!("dark"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/settings/theme").to_request();
        let theme: Theme = test::call_and_read_body_json(&app, req).await;
        assert_eq!(theme, Theme::Dark);
    }
}
