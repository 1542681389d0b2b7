use serde::Serialize;

use crate::generator::{GenerationError, GenerationErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Provider,
    Infra,
    Policy,
    Unknown,
}

impl From<GenerationErrorKind> for ErrorKind {
    fn from(kind: GenerationErrorKind) -> Self {
        match kind {
            GenerationErrorKind::Validation => Self::Validation,
            GenerationErrorKind::Configuration => Self::Policy,
            GenerationErrorKind::Generation | GenerationErrorKind::Timeout => Self::Provider,
        }
    }
}

impl From<&GenerationError> for ErrorKind {
    fn from(error: &GenerationError) -> Self {
        error.kind().into()
    }
}
