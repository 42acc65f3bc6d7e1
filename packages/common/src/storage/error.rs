use thiserror::Error;

/// Errors raised by a [`ContestStore`](super::ContestStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend rejected the operation or is unreachable.
    #[error("storage backend error: {0}")]
    Backend(String),
    /// A stored document could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(feature = "sea-orm")]
impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Backend(err.to_string())
    }
}
