use std::path::Path;

use super::errors::{DomainError, DomainResult};

/// Etiquetas con las que se entrenó el clasificador (despliegue original).
const DEFAULT_SIGNS: [&str; 51] = [
    "Minute", "Morning", "cheap", "Month", "flat", "Blind", "Monday", "Week", "happy", "he",
    "tight", "Nice", "loose", "Mean", "sad", "Today", "loud", "she", "Tomorrow", "Friday",
    "expensive", "Ugly", "it", "Second", "curved", "I", "we", "poor", "thick", "Yesterday",
    "you (plural)", "quiet", "Time", "Tuesday", "Sunday", "Deaf", "they", "Hour", "Year", "thin",
    "rich", "Beautiful", "Thursday", "male", "Saturday", "you", "Afternoon", "Night", "Wednesday",
    "Evening", "female",
];

/// Tabla ordenada índice -> etiqueta.
///
/// El orden replica al label encoder del entrenamiento: etiquetas únicas ordenadas
/// por bytes, de modo que el índice `i` de la salida del modelo es `labels[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    labels: Vec<String>,
}

impl Vocabulary {
    pub fn from_labels<I, S>(labels: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels
            .into_iter()
            .map(Into::into)
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        labels.sort();
        labels.dedup();

        if labels.is_empty() {
            return Err(DomainError::InvalidInput("vocabulary has no labels".into()));
        }
        Ok(Self { labels })
    }

    pub fn default_signs() -> Self {
        let mut labels: Vec<String> = DEFAULT_SIGNS.iter().map(|s| s.to_string()).collect();
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    /// Una etiqueta por línea; las líneas vacías se ignoran.
    pub fn from_file(path: &Path) -> DomainResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::NotFound(format!("labels file {}: {}", path.display(), e))
        })?;
        Self::from_labels(raw.lines())
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
