use anyhow::bail;
use async_trait::async_trait;
use disputes::{ProviderInfo, ReasoningProvider};

/// Reasoning provider backed by any OpenAI-compatible chat-completions
/// endpoint (OpenAI, OpenRouter, LM Studio, ...). Constructed once at
/// startup and shared across requests.
pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn new(base_url: String, api_key: Option<String>, model: String, max_tokens: u32) -> Self {
        Self {
            base_url,
            api_key,
            model,
            max_tokens,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ReasoningProvider for OpenAiCompatProvider {
    async fn ask(&self, prompt: &str, system_instructions: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_instructions},
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.2,
            "max_tokens": self.max_tokens
        });

        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let mut req = self.client.post(url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?.error_for_status()?;
        let json: serde_json::Value = resp.json().await?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();
        if content.is_empty() {
            bail!("provider returned an empty completion");
        }
        Ok(content)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let url = format!("{}/v1/models", self.base_url.trim_end_matches('/'));
        let mut req = self.client.get(url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        req.send().await?.error_for_status()?;
        Ok(())
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "openai-compat".to_string(),
            model: self.model.clone(),
        }
    }
}
