//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad construction input (e.g., an empty or wrongly sized key).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Ciphertext could not be decrypted under the configured key.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Plaintext could not be encrypted.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// The cache backend call failed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Decrypted bytes did not deserialize into the expected shape.
    #[error("Malformed record at {key}: {reason}")]
    MalformedRecord { key: String, reason: String },

    /// A value could not be serialized or converted.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
