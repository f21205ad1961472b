use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while indexing or reading a trajectory.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),

    /// A line past the end of the source was requested.
    ///
    /// `available` is the number of lines the source turned out to contain.
    #[error("line {requested} is out of range, the source contains {available} lines")]
    OutOfRange { requested: usize, available: usize },

    /// The source was exhausted before the requested frame could be discovered.
    #[error("frame {0} not found in trajectory")]
    FrameNotFound(usize),

    /// A header or data line could not be split or converted as expected.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A header line required by the format is missing where it should be.
    #[error("schema mismatch at line {line}: expected {expected}")]
    SchemaMismatch { line: usize, expected: String },

    /// A frame number was given that is not a non-negative integer.
    #[error("invalid frame number '{0}'")]
    InvalidFrameNumber(String),
}

impl Error {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(line: usize, expected: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            line,
            expected: expected.into(),
        }
    }

    /// Returns `true` if this error marks the end of the discoverable frames.
    pub fn is_frame_not_found(&self) -> bool {
        matches!(self, Self::FrameNotFound(_))
    }
}

/// Parse a user-provided frame number, rejecting negative and non-integer values.
///
/// This never touches a reader, so a bad frame number is caught before any I/O happens.
pub fn parse_frame_number(s: &str) -> Result<usize> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidFrameNumber(s.to_string()))
}
