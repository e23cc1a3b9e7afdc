//! Error taxonomy shared by every component.
//!
//! Every fallible operation returns one of these variants instead of a
//! falsy default, so callers can tell "legitimately empty" apart from
//! "lookup failed".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A free-text period label could not be resolved to a date. The
    /// caller decides the fallback, never this crate.
    #[error("could not parse period '{0}'")]
    Parse(String),

    /// The operation would violate an invariant (duplicate open version,
    /// duplicate workout code, delete blocked by references).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The entity does not exist or does not belong to the requesting user.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input rejected before any mutation reached the store.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
