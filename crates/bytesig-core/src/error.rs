//! Error types for the bytesig-core library.
//!
//! This module provides comprehensive error handling using the `thiserror` crate,
//! with detailed error variants for different failure modes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bytesig operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all bytesig operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A memory source failed to produce a requested byte range
    #[error("failed to read {length} bytes at offset {offset}: {details}")]
    SourceRead {
        /// Start of the requested range
        offset: usize,
        /// Number of bytes requested
        length: usize,
        /// Detailed description of the failure
        details: String,
    },

    /// Failed to parse a pattern definition
    #[error("invalid pattern '{name}': {details}")]
    PatternParse {
        /// Name of the offending pattern
        name: String,
        /// Detailed description of the issue
        details: String,
    },

    /// Pattern data and mask lengths disagree
    #[error("pattern '{name}' has {data_len} data bytes but {mask_len} mask entries")]
    MaskLengthMismatch {
        /// Name of the offending pattern
        name: String,
        /// Number of data bytes
        data_len: usize,
        /// Number of mask entries
        mask_len: usize,
    },

    /// Pattern contains no bytes to match
    #[error("pattern '{name}' is empty")]
    EmptyPattern {
        /// Name of the offending pattern
        name: String,
    },

    /// Two patterns in one set share a name
    #[error("duplicate pattern name '{name}' in pattern set")]
    DuplicateName {
        /// The repeated name
        name: String,
    },

    /// One or more patterns matched at more than one position
    #[error("non-unique pattern(s) {names:?}: each pattern must occur exactly once")]
    NonUniquePattern {
        /// Names of the patterns that matched more than once
        names: Vec<String>,
    },

    /// One or more patterns were not found anywhere in the buffer
    #[error("pattern(s) {names:?} not found in buffer")]
    PatternNotFound {
        /// Names of the patterns that were never matched
        names: Vec<String>,
    },

    /// Skip adjustment moved a match offset out of the buffer
    #[error("pattern '{name}': skip adjustment {skip} applied to offset {offset} is out of range")]
    SkipOutOfRange {
        /// Name of the offending pattern
        name: String,
        /// Raw match offset before adjustment
        offset: usize,
        /// The configured skip adjustment
        skip: isize,
    },

    /// Failed to build the scan worker pool
    #[error("failed to build scan thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new source read error
    pub fn source_read(offset: usize, length: usize, details: impl Into<String>) -> Self {
        Self::SourceRead {
            offset,
            length,
            details: details.into(),
        }
    }

    /// Creates a new pattern parse error
    pub fn pattern_parse(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::PatternParse {
            name: name.into(),
            details: details.into(),
        }
    }

    /// Creates a new duplicate name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Returns true if this error indicates bad pattern data that must be
    /// corrected externally (as opposed to an I/O or environment failure)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::PatternParse { .. }
                | Self::MaskLengthMismatch { .. }
                | Self::EmptyPattern { .. }
                | Self::DuplicateName { .. }
                | Self::NonUniquePattern { .. }
                | Self::PatternNotFound { .. }
                | Self::SkipOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PatternNotFound {
            names: vec!["GameStates".to_string()],
        };
        assert!(err.to_string().contains("GameStates"));
        assert!(err.to_string().contains("not found"));

        let err = Error::pattern_parse("Broken", "stray token 'XZ'");
        assert!(err.to_string().contains("Broken"));
        assert!(err.to_string().contains("stray token"));
    }

    #[test]
    fn test_is_configuration() {
        let dup = Error::NonUniquePattern {
            names: vec!["A".to_string()],
        };
        assert!(dup.is_configuration());
        assert!(Error::duplicate_name("A").is_configuration());

        let io = Error::file_read(
            "/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(!io.is_configuration());
    }
}
