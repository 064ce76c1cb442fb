//! `twoface::Error` wraps a Rust error type with a user-facing description. This stops callers from
//! showing users your internal errors, which might contain sensitive implementation details (SQL,
//! password digests, connection strings) that should be kept private.

mod extensions;
pub mod externalerror;

pub use extensions::*;
pub use externalerror::{Cause, ExternalError};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Wraps a Rust error type with a user-facing description. This stops users from seeing your internal
/// errors, which might contain sensitive implementation details that should be kept private.
#[derive(Debug)]
pub struct TfError {
    /// The underlying error, from some function. May contain sensitive information, so it should
    /// not be shown to users.
    pub internal: anyhow::Error,
    /// A user-friendly error that doesn't contain any sensitive information.
    pub external: ExternalError,
}

impl TfError {
    pub fn cause(&self) -> Cause {
        self.external.cause
    }

    /// Look for a typed error (e.g. `ValidationErrors`) inside the internal error.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.internal.downcast_ref::<E>()
    }
}

/// Displaying a twoface::Error will only display the external section. The internal error remains
/// private.
impl Display for TfError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        write!(f, "{}", self.external)
    }
}

/// Return type of a function that could fail. If it fails, it includes a twoface error (an error with
/// both internal- and external-facing values).
pub type Fallible<T> = Result<T, TfError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_only_external_part_is_shown() {
        let io_err = std::fs::read("secret-filename-do-not-leak-to-user").unwrap_err();
        let err = io_err.describe(ExternalError {
            cause: Cause::ServerError,
            text: "An IO error occurred",
        });
        assert_eq!(err.to_string(), "ServerError: An IO error occurred");
    }

    #[test]
    fn test_internal_errors_default_to_server_error() {
        let err: TfError = anyhow!("connection refused by 10.0.0.3:5432").into();
        assert!(matches!(err.cause(), Cause::ServerError));
        assert_eq!(err.to_string(), "ServerError: Internal server error");
    }

    #[test]
    fn test_typed_internal_errors_can_be_recovered() {
        let err = std::fs::read("missing-file")
            .describe_err(ExternalError {
                cause: Cause::NotFound,
                text: "file not found",
            })
            .unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
        assert!(err.downcast_ref::<std::fmt::Error>().is_none());
    }
}
