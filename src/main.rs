use clap::Parser;
use prompt_structurer_rs::api::{self, AppState};
use prompt_structurer_rs::gemini::{GeminiClient, DEFAULT_MODEL};
use prompt_structurer_rs::service::PromptService;
use prompt_structurer_rs::storage::{FileSystemStorage, PostgresStorage, TemplateStorage};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to run the server on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Storage backend type (filesystem, postgres)
    #[arg(long, default_value = "filesystem")]
    storage: String,

    /// PostgreSQL connection URL
    #[arg(long)]
    db_url: Option<String>,

    /// Directory for template storage (when using filesystem storage)
    #[arg(long, default_value = "./templates")]
    template_dir: String,

    /// Gemini model used for structuring and enhancement
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Use `RUST_LOG=info` (or debug, trace, etc.) to control log level
    // Example: RUST_LOG=prompt_structurer_rs=debug cargo run
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();
    tracing::info!(args = ?args, "Starting prompt structurer server");

    let storage: Arc<dyn TemplateStorage> = match args.storage.as_str() {
        "filesystem" => {
            tracing::info!(path = %args.template_dir, "Using filesystem storage");
            Arc::new(FileSystemStorage::new(args.template_dir))
        }
        "postgres" => {
            let db_url = args
                .db_url
                .clone()
                .expect("--db-url is required for postgres storage");
            tracing::info!(url = %db_url, "Using PostgreSQL storage");
            let pg_storage = PostgresStorage::new(&db_url)
                .await
                .expect("Failed to connect to PostgreSQL");
            pg_storage
                .init_schema()
                .await
                .expect("Failed to initialize DB schema");
            tracing::info!("Database schema initialized (if not exists)");
            Arc::new(pg_storage)
        }
        _ => {
            tracing::error!(storage_type = %args.storage, "Unsupported storage type specified");
            panic!("Unsupported storage type: {}", args.storage);
        }
    };

    // A missing key is not fatal: every request is then served by the
    // heuristic fallback.
    let remote = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => {
            tracing::info!(model = %args.model, "Gemini delegation enabled");
            Some(
                GeminiClient::new(key, args.model.clone())
                    .expect("Failed to build Gemini client"),
            )
        }
        _ => {
            tracing::warn!("GEMINI_API_KEY not set, running with heuristic fallback only");
            None
        }
    };

    let state = actix_web::web::Data::new(AppState {
        service: PromptService::new(remote),
        storage,
    });

    let addr = format!("127.0.0.1:{}", args.port);
    tracing::info!(address = %addr, "Starting HTTP server");
    actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .app_data(state.clone())
            .configure(api::configure)
    })
    .bind(addr)?
    .run()
    .await
}
