use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use disputes::ReasoningProvider;

use arbiter::config::AppConfig;
use arbiter::provider_openai::OpenAiCompatProvider;
use arbiter::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env()?;

    // --- Postgres ---
    let pg_pool = PgPool::connect(&cfg.database_url)
        .await
        .context("Failed to connect to Postgres")?;

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run migrations")?;

    check_postgres(&pg_pool).await?;
    info!("postgres: ok");

    // Reasoning provider: one instance for the process lifetime, injected
    // through AppState. Optional; without it only AI resolution is off.
    let provider: Option<Arc<dyn ReasoningProvider>> = match &cfg.llm_base_url {
        Some(base_url) => {
            let p = OpenAiCompatProvider::new(
                base_url.clone(),
                cfg.llm_api_key.clone(),
                cfg.llm_model.clone(),
                cfg.llm_max_tokens,
            );
            match p.ping().await {
                Ok(()) => info!(model = %cfg.llm_model, "reasoning provider: ok"),
                Err(e) => warn!("reasoning provider unreachable at startup: {e:?}"),
            }
            Some(Arc::new(p))
        }
        None => {
            warn!("LLM_BASE_URL not set; AI resolution disabled");
            None
        }
    };

    let app_state = Arc::new(AppState::new(pg_pool, provider));
    let app = arbiter::app(app_state);

    let addr = &cfg.bind_addr;
    info!("arbiter listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn check_postgres(pg_pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pg_pool)
        .await
        .context("Postgres ping failed")?;
    Ok(())
}
