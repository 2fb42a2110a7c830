/*!
Errors produced by the encoding pipeline
*/
use crate::store::Field;
use std::path::PathBuf;
use thiserror::Error;

/// An error raised by a pipeline stage or by field persistence
#[derive(Debug, Error)]
pub enum Error {
    /// The source text could not be read
    #[error("could not read {path:?}: {source}")]
    Io {
        /// The path which was being read or written
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// The vocabulary fraction lies outside of (0, 1]
    #[error("vocabulary fraction must lie in (0, 1], got {0}")]
    InvalidFraction(f64),
    /// A stage was run before the stage producing one of its inputs
    #[error("`{0}` has not been produced yet")]
    MissingField(Field),
    /// An index does not fit in the one-hot width
    #[error("index {index} is out of range for a vocabulary of size {size}")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// The vocabulary size
        size: usize,
    },
    /// One-hot data must be a single vector or a batch of vectors
    #[error("one-hot data must have rank 1 or 2, got rank {0}")]
    UnsupportedRank(usize),
    /// A token list does not form a valid vocabulary
    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),
    /// A field name which does not name a stored field
    #[error("unknown field {0:?}")]
    UnknownField(String),
    /// A value does not have the shape a field is stored with
    #[error("value does not match the schema of `{0}`")]
    SchemaMismatch(Field),
    /// A persisted field could not be encoded or decoded
    #[error("field encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
    /// A persisted field was written by an incompatible format version
    #[error("{path:?} has format version {found}, expected {expected}")]
    VersionMismatch {
        /// The persisted file
        path: PathBuf,
        /// The version found in the file
        found: u32,
        /// The version this build reads and writes
        expected: u32,
    },
    /// A persisted file holds a different field than the one requested
    #[error("{path:?} holds `{found}`, expected `{expected}`")]
    FieldMismatch {
        /// The persisted file
        path: PathBuf,
        /// The field found in the file
        found: Field,
        /// The field requested
        expected: Field,
    },
}

/// A result whose error is an encoder [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an IO error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
