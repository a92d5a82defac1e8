use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::application::ports::SentenceGeneratorPort;
use crate::domain::prediction::SignSequence;

/// Instrucción enviada al modelo generativo, con los signos en orden.
pub fn build_prompt(signs: &[String]) -> String {
    format!(
        "Generate a single probable sentence from these sign language keywords: [{}]. \
         Keep it natural and grammatically correct.",
        signs.join(", ")
    )
}

/// Limpia la respuesta del modelo. `None` si no queda texto útil.
fn clean_generated(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();
    (!unquoted.is_empty()).then(|| unquoted.to_string())
}

/// Glosa -> frase. Con dos o más signos consulta al generador externo y, ante
/// cualquier fallo, devuelve los signos unidos por espacios.
#[derive(Clone)]
pub struct SentenceComposer {
    generator: Arc<dyn SentenceGeneratorPort>,
    timeout: Duration,
}

impl SentenceComposer {
    pub fn new(generator: Arc<dyn SentenceGeneratorPort>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub async fn compose(&self, signs: &SignSequence) -> String {
        match signs.len() {
            0 => String::new(),
            1 => signs[0].clone(),
            _ => self.generate_or_join(signs).await,
        }
    }

    async fn generate_or_join(&self, signs: &SignSequence) -> String {
        let prompt = build_prompt(signs);
        debug!(generator = self.generator.name(), "🧠 Composing sentence from {} signs", signs.len());

        match tokio::time::timeout(self.timeout, self.generator.generate(&prompt)).await {
            Ok(Ok(text)) => match clean_generated(&text) {
                Some(sentence) => sentence,
                None => {
                    warn!("⚠️ Generator returned an empty sentence, using literal gloss");
                    signs.joined()
                }
            },
            Ok(Err(e)) => {
                warn!("Error generating sentence: {}", e);
                signs.joined()
            }
            Err(_) => {
                warn!("⏱️ Sentence generation timed out after {:?}", self.timeout);
                signs.joined()
            }
        }
    }
}
