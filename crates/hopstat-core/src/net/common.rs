use crate::error::ErrorKind;
use crate::error::{Error, Result};

/// Utility methods to map errors.
pub struct ErrorMapper;

impl ErrorMapper {
    /// Convert a given [`ErrorKind`] to [`Error::ProbeFailed`].
    ///
    /// A probe which fails to send for one of these reasons is recorded as
    /// lost rather than ending the run.
    #[allow(clippy::needless_pass_by_value)]
    pub fn probe_failed(err: Error, kind: ErrorKind) -> Error {
        match err {
            Error::IoError(io_err) if io_err.kind() == kind => Error::ProbeFailed(io_err),
            _ => err,
        }
    }
}
