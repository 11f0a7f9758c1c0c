//! Error types for `tipster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("ingestion payload must be a JSON object")]
  PayloadNotObject,

  #[error("invalid over/under threshold: {0:?}")]
  InvalidThreshold(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of a store failure, used by the HTTP layer to pick a
/// status code without knowing the concrete backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  NotFound,
  Conflict,
  Invalid,
  Internal,
}

/// Implemented by every [`TipStore`](crate::store::TipStore) error type.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn class(&self) -> ErrorClass;
}
