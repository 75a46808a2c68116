use anyhow::{bail, Context, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,

    /// OpenAI-compatible endpoint. When unset, the resolve endpoint
    /// answers 503 instead of calling a provider.
    pub llm_base_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_max_tokens: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = get("DATABASE_URL")?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        let llm_base_url = std::env::var("LLM_BASE_URL").ok().filter(|v| !v.is_empty());
        let llm_api_key = std::env::var("LLM_API_KEY").ok().filter(|v| !v.is_empty());
        let llm_model =
            std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let llm_max_tokens = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1024);

        // Tiny sanity checks (fail fast, fail loud)
        if let Some(url) = &llm_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("LLM_BASE_URL must start with http:// or https://");
            }
        }

        Ok(Self {
            database_url,
            bind_addr,
            llm_base_url,
            llm_api_key,
            llm_model,
            llm_max_tokens,
        })
    }
}

fn get(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Missing required env var: {key}"))
}
