//! Convenience methods to turn any error (from any library) into twoface errors.
use crate::twoface::{Cause, ExternalError, TfError};
use anyhow::anyhow;

pub trait Describe {
    /// Convert an error into a twoface::Error by describing it to your callers.
    fn describe(self, external: ExternalError) -> TfError;
}

impl<Internal: Into<anyhow::Error>> Describe for Internal {
    fn describe(self, external: ExternalError) -> TfError {
        TfError {
            internal: self.into(),
            external,
        }
    }
}

/// Any regular internal error can be turned into a twoface Error, using the default external error.
/// If you want to give an internal error a custom external error, use `internal.describe(ExternalError)`
impl<Internal: Into<anyhow::Error>> From<Internal> for TfError {
    fn from(internal: Internal) -> TfError {
        internal.describe(Default::default())
    }
}

pub trait DescribeErr<T> {
    /// Convert a result's error into a twoface::Error by describing it to your callers.
    /// ```ignore
    /// // These two are equivalent:
    /// let a: Fallible<i32> = Err("some private internal error").map_err(|e| anyhow!(e).describe(external));
    /// let b: Fallible<i32> = Err(anyhow!("some private internal error")).describe_err(external);
    /// ```
    fn describe_err(self, external: ExternalError) -> Result<T, TfError>;
}

impl<T, E> DescribeErr<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn describe_err(self, external: ExternalError) -> Result<T, TfError> {
        self.map_err(|e| e.describe(external))
    }
}

/// Build an error for a request the caller should not have made, e.g. following yourself. There's
/// no underlying library error, so the internal half just repeats the text.
pub fn reject(cause: Cause, text: &'static str) -> TfError {
    anyhow!(text).describe(ExternalError { cause, text })
}
