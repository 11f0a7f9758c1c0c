//! Error type for `tipster-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;
use tipster_core::{ErrorClass, StoreError};

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tipster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("cannot decode column: {0}")]
  Decode(String),

  /// Prerequisite seed data is missing.
  #[error("sport {0:?} has not been seeded")]
  SportNotFound(String),

  #[error("plan not found: {0}")]
  PlanNotFound(i64),

  #[error("tip not found: {0}")]
  TipNotFound(i64),

  #[error("user not found: {0}")]
  UserNotFound(i64),

  #[error("{0} already exists")]
  Duplicate(String),

  #[error("a tip cannot be settled as pending")]
  PendingSettlement,

  #[error("subscription end date out of range")]
  EndOutOfRange,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// Unwrap an error that crossed the connection thread boundary inside
  /// [`tokio_rusqlite::Error::Other`].
  pub(crate) fn from_call(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
        Ok(own) => *own,
        Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
      },
      other => Error::Database(other),
    }
  }

  fn sqlite_code(&self) -> Option<ErrorCode> {
    let sqlite = match self {
      Error::Sqlite(e) | Error::Database(tokio_rusqlite::Error::Rusqlite(e)) => e,
      _ => return None,
    };
    match sqlite {
      rusqlite::Error::SqliteFailure(failure, _) => Some(failure.code),
      _ => None,
    }
  }

  /// Lock contention that is worth retrying.
  pub fn is_transient(&self) -> bool {
    matches!(
      self.sqlite_code(),
      Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
  }
}

impl StoreError for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Error::PlanNotFound(_) | Error::TipNotFound(_) | Error::UserNotFound(_) => {
        ErrorClass::NotFound
      }
      Error::Duplicate(_) => ErrorClass::Conflict,
      Error::PendingSettlement => ErrorClass::Invalid,
      _ if self.sqlite_code() == Some(ErrorCode::ConstraintViolation) => ErrorClass::Conflict,
      _ => ErrorClass::Internal,
    }
  }
}

#[cfg(test)]
mod tests {
  use rusqlite::ffi;

  use super::*;

  fn failure(code: i32) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
  }

  #[test]
  fn lock_contention_is_transient() {
    assert!(Error::Sqlite(failure(ffi::SQLITE_BUSY)).is_transient());
    assert!(Error::Sqlite(failure(ffi::SQLITE_LOCKED)).is_transient());
    assert!(
      Error::Database(tokio_rusqlite::Error::Rusqlite(failure(ffi::SQLITE_BUSY))).is_transient()
    );
  }

  #[test]
  fn constraint_violation_is_a_permanent_conflict() {
    let err = Error::Sqlite(failure(ffi::SQLITE_CONSTRAINT));
    assert!(!err.is_transient());
    assert_eq!(err.class(), ErrorClass::Conflict);
    assert!(!Error::PlanNotFound(1).is_transient());
  }
}
