use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    /// Two vectors/matrices that must agree in length or row count do not.
    DimensionMismatch(String),
    /// A construction-time hyper-parameter combination is not usable.
    InvalidConfig(String),
    /// The requested operation is intentionally not implemented
    /// (e.g. the derivative of the softmax activation).
    UnsupportedOperation(String),
    /// A runtime argument is out of range (e.g. a split fraction).
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DimensionMismatch(msg) => write!(f, "dimension mismatch: {msg}"),
            Error::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Error::UnsupportedOperation(msg) => write!(f, "unsupported operation: {msg}"),
            Error::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
