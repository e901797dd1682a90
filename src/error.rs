use thiserror::Error;

/// Result type for fleet operations
pub type FleetResult<T> = std::result::Result<T, FleetError>;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Wallet generation failed for {wallet}: {reason}")]
    Generation { wallet: String, reason: String },

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Transfer to {recipient} failed: {reason}")]
    Transfer { recipient: String, reason: String },

    #[error("Price oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error(
        "Distribution applied {succeeded} transfer(s) ({failed} failed) but saving the result failed: {source}"
    )]
    DistributionPersistence {
        succeeded: usize,
        failed: usize,
        #[source]
        source: StorageError,
    },
}

impl FleetError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Malformed document {name}: {reason}")]
    Malformed { name: String, reason: String },
}
