pub mod gemini;
pub mod ollama;

#[cfg(test)]
pub(crate) mod test_server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::application::ports::SentenceGeneratorPort;
use crate::config::{LlmConfig, LlmProvider};
use crate::domain::errors::{DomainError, DomainResult};

use self::{gemini::GeminiSentenceGenerator, ollama::OllamaSentenceGenerator};

/// Sin generador: el compositor siempre usa la unión literal.
pub struct DisabledGenerator;

#[async_trait]
impl SentenceGeneratorPort for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> DomainResult<String> {
        Err(DomainError::OperationFailed("sentence generation disabled".into()))
    }
}

pub fn build_generator(cfg: &LlmConfig) -> Result<Arc<dyn SentenceGeneratorPort>> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let generator: Arc<dyn SentenceGeneratorPort> = match cfg.provider {
        LlmProvider::Disabled => Arc::new(DisabledGenerator),
        LlmProvider::Ollama => {
            let ollama = OllamaSentenceGenerator::new(&cfg.base_url(), &cfg.model(), cfg.temperature, timeout);
            let probe = ollama.clone();
            tokio::spawn(async move {
                probe.check_status().await;
            });
            Arc::new(ollama)
        }
        LlmProvider::Gemini => {
            let Some(api_key) = cfg.api_key() else {
                bail!("llm.provider = gemini requires llm.api_key or GEMINI_API_KEY");
            };
            Arc::new(GeminiSentenceGenerator::new(&cfg.base_url(), &cfg.model(), api_key, cfg.temperature, timeout))
        }
    };
    tracing::info!("🗣️ Sentence generator: {} ({})", generator.name(), cfg.model());
    Ok(generator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_generator_always_fails() {
        let cfg = LlmConfig { provider: LlmProvider::Disabled, ..LlmConfig::default() };
        let generator = build_generator(&cfg).unwrap();
        assert_eq!(generator.name(), "disabled");
        assert!(generator.generate("anything").await.is_err());
    }

    #[tokio::test]
    async fn gemini_with_key_builds() {
        let cfg = LlmConfig {
            provider: LlmProvider::Gemini,
            api_key: Some("test-key".into()),
            ..LlmConfig::default()
        };
        assert_eq!(build_generator(&cfg).unwrap().name(), "gemini");
    }

    #[tokio::test]
    async fn ollama_builds_without_reachable_server() {
        let cfg = LlmConfig {
            provider: LlmProvider::Ollama,
            base_url: Some("http://127.0.0.1:9".into()),
            ..LlmConfig::default()
        };
        assert_eq!(build_generator(&cfg).unwrap().name(), "ollama");
    }
}
