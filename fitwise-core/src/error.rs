//! Error taxonomy for the scoring/recommendation engine.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FitwiseError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: u64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Data access failure: {0}")]
    DataAccess(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FitwiseError {
    pub fn task_not_found(id: u64) -> Self {
        Self::NotFound { entity: "task", id }
    }

    pub fn user_not_found(id: u64) -> Self {
        Self::NotFound { entity: "user", id }
    }

    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn data_access<M: Into<String>>(message: M) -> Self {
        Self::DataAccess(message.into())
    }

    /// Stable machine-readable code, independent of the display message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation_failed",
            Self::DataAccess(_) => "data_access",
            Self::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, FitwiseError>;
