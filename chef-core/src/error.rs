use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChefError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unsupported recipe, base, compression or verification method.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Out-of-range symbol, wrong symbol count, bad padding or malformed header.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The compressor rejected the unpacked bytes.
    #[error("Corrupt compressed payload: {0}")]
    Corruption(String),

    #[error("Verification failed: expected digest {expected}, got {actual}")]
    Verification { expected: String, actual: String },

    /// No viable worker pool or chunk size for the memory budget.
    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Batch cancelled before the job started")]
    Cancelled,
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, ChefError>;
