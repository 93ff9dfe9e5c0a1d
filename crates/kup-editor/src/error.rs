//! Errors produced by the text model.
//!
//! Position arguments never fail: rows and columns out of range clamp to the
//! nearest valid position. What remains are file errors and the two ways a
//! save can end without writing anything.

use std::io;

use thiserror::Error;

/// Failure of a document operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// `save` was called on a document that has never been named.
    #[error("no file name")]
    NoFileName,

    /// The user dismissed the save-as prompt.
    #[error("save aborted")]
    SaveAborted,
}

/// Result alias for document operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_message_carries_source() {
        let err = Error::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(err.to_string(), "I/O error: denied");
    }

    #[test]
    fn question_mark_converts_io() {
        fn fails() -> Result<()> {
            Err(io::Error::other("boom"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(Error::Io(_))));
    }

    #[test]
    fn plain_variants() {
        assert_eq!(Error::NoFileName.to_string(), "no file name");
        assert_eq!(Error::SaveAborted.to_string(), "save aborted");
    }
}
