use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::application::ports::SentenceGeneratorPort;
use crate::domain::errors::{DomainError, DomainResult};

/// Generador de frases sobre `generateContent` de Gemini.
#[derive(Clone)]
pub struct GeminiSentenceGenerator {
    client: reqwest::Client,
    base_url: String,
    model_name: String,
    api_key: String,
    temperature: f32,
}

impl GeminiSentenceGenerator {
    pub fn new(base_url: &str, model_name: &str, api_key: String, temperature: f32, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            api_key,
            temperature,
        }
    }
}

#[async_trait]
impl SentenceGeneratorPort for GeminiSentenceGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> DomainResult<String> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model_name);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature }
        });

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::OperationFailed(format!("gemini request: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            return Err(DomainError::OperationFailed(format!(
                "gemini HTTP {}: {}",
                status,
                res.text().await.unwrap_or_default()
            )));
        }

        let json_resp: serde_json::Value = res
            .json()
            .await
            .map_err(|e| DomainError::OperationFailed(format!("gemini JSON: {}", e)))?;
        json_resp["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DomainError::OperationFailed("gemini reply without text candidate".into()))
    }
}
