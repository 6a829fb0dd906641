//! Error types for intcache

use std::fmt;

/// Result type alias for intcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cache operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The pair (0, 0) is the empty-slot sentinel and cannot be stored
    InvalidEntry,

    /// Requested bucket exponent is larger than the table can address
    SizeExponentTooLarge {
        /// Exponent that was requested
        exponent: u8,
        /// Largest exponent accepted on this target
        max: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidEntry => write!(f, "Invalid entry: key and value can't both be 0"),
            Error::SizeExponentTooLarge { exponent, max } => {
                write!(f, "Size exponent too large: {} (max {})", exponent, max)
            }
        }
    }
}

impl std::error::Error for Error {}
