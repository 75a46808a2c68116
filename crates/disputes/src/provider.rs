use async_trait::async_trait;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

/// Reasoning collaborator: one request, one narrative response. The
/// concrete implementation lives in the service; tests use a scripted stub.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    async fn ask(&self, prompt: &str, system_instructions: &str) -> anyhow::Result<String>;
    async fn ping(&self) -> anyhow::Result<()>;
    fn info(&self) -> ProviderInfo;
}
