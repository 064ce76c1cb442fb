use crate::datastore::ConstraintViolation;
use crate::twoface::{ExternalError, Fallible, TfError};
use actix_threadpool::BlockingError;
use anyhow::anyhow;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Convenience extension used to extract errors from `block`.
pub trait BlockingResp<T> {
    /// Convert the return from a threadpool job into a normal `Fallible<T>`.
    fn to_resp(self) -> Fallible<T>;
}

impl<T, I: std::fmt::Debug + Into<TfError>> BlockingResp<T> for Result<T, BlockingError<I>> {
    fn to_resp(self) -> Fallible<T> {
        match self {
            Ok(t) => Ok(t),
            Err(BlockingError::Error(err)) => Err(err.into()),
            Err(BlockingError::Canceled) => Err(TfError {
                internal: anyhow!("DB operation cancelled"),
                external: ExternalError::default(),
            }),
        }
    }
}

/// A unique index refused the write: report it as `violation` so callers can react. Any other
/// database error stays a server error.
pub fn on_unique_violation(err: DieselError, violation: ConstraintViolation) -> TfError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => violation.into_error(),
        other => other.into(),
    }
}
