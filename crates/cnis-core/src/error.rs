//! Error types for the CNIS history engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Source read error: {0}")]
    SourceRead(String),

    #[error("Source document is password protected")]
    PasswordProtected,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error originated while decoding the source document.
    pub fn is_source_error(&self) -> bool {
        matches!(self, Self::SourceRead(_) | Self::PasswordProtected)
    }

    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::PasswordProtected => "Arquivo protegido por senha.".to_string(),
            Self::SourceRead(_) => "Erro ao ler PDF. Tente outro arquivo.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
