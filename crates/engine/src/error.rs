//! The module contains the errors the engine can throw.
//!
//! The taxonomy follows the HTTP surface: [`NotFound`] covers both missing
//! rows and ownership violations (the two are never distinguished),
//! [`Conflict`] covers business-rule rejections such as deleting a default
//! entity, and [`InvalidInput`] covers malformed payloads.
//!
//! [`NotFound`]: EngineError::NotFound
//! [`Conflict`]: EngineError::Conflict
//! [`InvalidInput`]: EngineError::InvalidInput

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not exists")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
