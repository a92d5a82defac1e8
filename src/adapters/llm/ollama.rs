use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::application::ports::SentenceGeneratorPort;
use crate::domain::errors::{DomainError, DomainResult};

/// Generador de frases sobre la API `/api/generate` de Ollama.
#[derive(Clone)]
pub struct OllamaSentenceGenerator {
    client: reqwest::Client,
    base_url: String,
    model_name: String,
    temperature: f32,
}

impl OllamaSentenceGenerator {
    pub fn new(base_url: &str, model_name: &str, temperature: f32, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            temperature,
        }
    }

    /// Comprueba que Ollama responde. Solo informa; nunca bloquea el arranque.
    pub async fn check_status(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(res) if res.status().is_success() => {
                info!("✅ Ollama ({}) ready.", self.model_name);
                true
            }
            Ok(res) => {
                warn!("⚠️ Ollama answered {} on {}", res.status(), url);
                false
            }
            Err(e) => {
                warn!("⚠️ Ollama not reachable at {}: {}", self.base_url, e);
                false
            }
        }
    }
}

#[async_trait]
impl SentenceGeneratorPort for OllamaSentenceGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> DomainResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = json!({
            "model": self.model_name,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": self.temperature }
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::OperationFailed(format!("ollama request: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            return Err(DomainError::OperationFailed(format!(
                "ollama HTTP {}: {}",
                status,
                res.text().await.unwrap_or_default()
            )));
        }

        let json_resp: serde_json::Value = res
            .json()
            .await
            .map_err(|e| DomainError::OperationFailed(format!("ollama JSON: {}", e)))?;
        json_resp["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DomainError::OperationFailed(format!("unexpected Ollama reply: {}", json_resp)))
    }
}
