//! Errors raised by the calculation engine.
use std::error::Error;
use std::fmt;

/// Indicates that a calculation could not be carried out.
///
/// Degenerate results (zero ROI, an unbounded payback period, negative savings) are not errors;
/// they are returned as ordinary values.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    /// An input value is not acceptable (e.g. unknown category or non-positive irradiance)
    InvalidInput(String),
    /// A lookup key (e.g. a system type in the pricing map) is missing
    KeyNotFound(String),
    /// Site data could not be found for the requested location
    DataUnavailable(String),
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::KeyNotFound(msg) => write!(f, "Key not found: {msg}"),
            Self::DataUnavailable(msg) => write!(f, "Data unavailable: {msg}"),
        }
    }
}

/// This is needed so that `CalcError` can be treated like standard errors are.
impl Error for CalcError {}
