use thiserror::Error;

use super::pipeline::PipelineStage;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("operation failed: {0}")]
    OperationFailed(String),
    #[error("{stage} failed: {message}")]
    Pipeline { stage: PipelineStage, message: String },
}

impl DomainError {
    /// Etiqueta el error con la etapa del pipeline donde ocurrió.
    /// Un error ya etiquetado conserva su etapa original.
    pub fn at(self, stage: PipelineStage) -> Self {
        match self {
            DomainError::Pipeline { .. } => self,
            other => DomainError::Pipeline { stage, message: other.to_string() },
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, DomainError::InvalidInput(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
