//! Unified error types for chatminutes.
//!
//! A single [`ChatminutesError`] enum covers every failure the library can
//! report. Parsing problems inside a chat export are deliberately absent:
//! an unparsable header date is not an error, it only makes the grouper
//! drop that message (see [`crate::core::grouper`]).
//!
//! The variants fall into three groups:
//!
//! - **Process-fatal**: [`InputNotFound`](ChatminutesError::InputNotFound),
//!   [`InputRead`](ChatminutesError::InputRead),
//!   [`Decode`](ChatminutesError::Decode),
//!   [`UnknownEncoding`](ChatminutesError::UnknownEncoding),
//!   [`OutputDir`](ChatminutesError::OutputDir)
//! - **Local to one day file**: [`Write`](ChatminutesError::Write)
//! - **Ledger persistence**: [`Ledger`](ChatminutesError::Ledger)

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::parsing::date::CanonicalDate;

/// A specialized [`Result`] type for chatminutes operations.
///
/// # Example
///
/// ```rust
/// use chatminutes::error::Result;
///
/// fn count_days() -> Result<usize> {
///     Ok(0)
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatminutesError>;

/// The error type for all chatminutes operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatminutesError {
    /// An I/O error occurred outside any more specific context.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The chat export does not exist.
    #[error("Input file not found: {} (encoding {encoding})", path.display())]
    InputNotFound {
        /// Path that was looked up
        path: PathBuf,
        /// Name of the encoding the export was to be read with
        encoding: &'static str,
    },

    /// The chat export exists but could not be read.
    #[error("Failed to read input file {} (encoding {encoding}): {source}", path.display())]
    InputRead {
        /// Path of the export
        path: PathBuf,
        /// Name of the encoding the export was to be read with
        encoding: &'static str,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The chat export is not valid text in the requested encoding.
    #[error("Input file {} is not valid {encoding}", path.display())]
    Decode {
        /// Path of the export
        path: PathBuf,
        /// Name of the encoding that was attempted
        encoding: &'static str,
    },

    /// The encoding label is not known.
    #[error("Unknown encoding '{label}'")]
    UnknownEncoding {
        /// The label as supplied by the caller
        label: String,
    },

    /// The output directory could not be created.
    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        /// Directory that was to receive the day files
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing one day file failed.
    ///
    /// Other days are unaffected; the writer collects these into a
    /// [`PartitionReport`](crate::core::writer::PartitionReport).
    #[error("Failed to write day {date} to {}: {source}", path.display())]
    Write {
        /// Day whose file could not be written
        date: CanonicalDate,
        /// Destination path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Reading or persisting the resume ledger failed.
    #[error("Ledger error at {}: {source}", path.display())]
    Ledger {
        /// Ledger file path
        path: PathBuf,
        /// What went wrong
        #[source]
        source: LedgerErrorKind,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A date supplied by the caller is not `YYYY-MM-DD`.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The rejected input
        input: String,
        /// Expected format description
        expected: &'static str,
    },
}

/// Kinds of ledger failures.
#[derive(Debug, Error)]
pub enum LedgerErrorKind {
    /// IO error on the ledger file or its lock
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The ledger file is not a valid ledger document
    #[error("malformed ledger: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatminutesError {
    /// Creates an input-not-found error.
    pub fn input_not_found(path: impl Into<PathBuf>, encoding: &'static str) -> Self {
        ChatminutesError::InputNotFound {
            path: path.into(),
            encoding,
        }
    }

    /// Creates an input read error, mapping `NotFound` to
    /// [`InputNotFound`](ChatminutesError::InputNotFound).
    pub fn input_read(
        path: impl Into<PathBuf>,
        encoding: &'static str,
        source: io::Error,
    ) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            ChatminutesError::InputNotFound { path, encoding }
        } else {
            ChatminutesError::InputRead {
                path,
                encoding,
                source,
            }
        }
    }

    /// Creates an output directory error.
    pub fn output_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ChatminutesError::OutputDir {
            path: path.into(),
            source,
        }
    }

    /// Creates a decode error.
    pub fn decode(path: impl Into<PathBuf>, encoding: &'static str) -> Self {
        ChatminutesError::Decode {
            path: path.into(),
            encoding,
        }
    }

    /// Creates an unknown encoding error.
    pub fn unknown_encoding(label: impl Into<String>) -> Self {
        ChatminutesError::UnknownEncoding {
            label: label.into(),
        }
    }

    /// Creates a day-file write error.
    pub fn write(date: CanonicalDate, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ChatminutesError::Write {
            date,
            path: path.into(),
            source,
        }
    }

    /// Creates a ledger error.
    pub fn ledger(path: impl Into<PathBuf>, source: impl Into<LedgerErrorKind>) -> Self {
        ChatminutesError::Ledger {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ChatminutesError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Returns `true` if this error ends the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ChatminutesError::InputNotFound { .. }
                | ChatminutesError::InputRead { .. }
                | ChatminutesError::Decode { .. }
                | ChatminutesError::UnknownEncoding { .. }
                | ChatminutesError::OutputDir { .. }
        )
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatminutesError::Io(_))
    }

    /// Returns `true` if this is a day-file write error.
    pub fn is_write(&self) -> bool {
        matches!(self, ChatminutesError::Write { .. })
    }

    /// Returns `true` if this is a ledger error.
    pub fn is_ledger(&self) -> bool {
        matches!(self, ChatminutesError::Ledger { .. })
    }

    /// Returns `true` if the ledger file exists but could not be parsed.
    pub fn is_malformed_ledger(&self) -> bool {
        matches!(
            self,
            ChatminutesError::Ledger {
                source: LedgerErrorKind::Malformed(_),
                ..
            }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> CanonicalDate {
        "2022-10-18".parse().unwrap()
    }

    #[test]
    fn test_input_not_found_display() {
        let err = ChatminutesError::input_not_found("/chats/export.txt", "UTF-8");
        let display = err.to_string();
        assert!(display.contains("not found"));
        assert!(display.contains("/chats/export.txt"));
        assert!(display.contains("UTF-8"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_input_read_maps_not_found() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = ChatminutesError::input_read("/x.txt", "UTF-8", io_err);
        assert!(matches!(err, ChatminutesError::InputNotFound { .. }));

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = ChatminutesError::input_read("/x.txt", "windows-1252", io_err);
        assert!(matches!(err, ChatminutesError::InputRead { .. }));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("windows-1252"));
    }

    #[test]
    fn test_decode_display_names_path_and_encoding() {
        let err = ChatminutesError::decode("/chats/export.txt", "UTF-8");
        let display = err.to_string();
        assert!(display.contains("/chats/export.txt"));
        assert!(display.contains("UTF-8"));
    }

    #[test]
    fn test_write_error_display() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = ChatminutesError::write(date(), "/out/Chat-2022-10-18.txt", io_err);
        let display = err.to_string();
        assert!(display.contains("2022-10-18"));
        assert!(display.contains("/out/Chat-2022-10-18.txt"));
        assert!(err.is_write());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_output_dir_display_names_path() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = ChatminutesError::output_dir("/out/raw", io_err);
        assert!(err.to_string().contains("/out/raw"));
        assert!(err.is_fatal());
        assert!(!err.is_io());
    }

    #[test]
    fn test_ledger_malformed() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ChatminutesError::ledger("/out/ledger.json", json_err);
        assert!(err.is_ledger());
        assert!(err.is_malformed_ledger());
        assert!(err.to_string().contains("malformed ledger"));

        let io_err = io::Error::other("disk full");
        let err = ChatminutesError::ledger("/out/ledger.json", io_err);
        assert!(err.is_ledger());
        assert!(!err.is_malformed_ledger());
    }

    #[test]
    fn test_invalid_date_display() {
        let err = ChatminutesError::invalid_date("18/10/22");
        let display = err.to_string();
        assert!(display.contains("18/10/22"));
        assert!(display.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = ChatminutesError::from(io_err);
        assert!(err.is_io());
        assert!(err.source().is_some());
    }
}
