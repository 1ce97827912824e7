#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the persistence backend itself failed, as opposed to a value
    /// that could not be encoded.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::StorageUnavailable(_) | StoreError::Database(_) | StoreError::Pool(_)
        )
    }

    /// Short text for the person at the keyboard. The detail is logged here
    /// and never shown.
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::StorageUnavailable(msg) => {
                tracing::error!("Storage unavailable: {}", msg);
                "Could not save. Storage is unavailable, please try again."
            }
            StoreError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Could not save. Storage is unavailable, please try again."
            }
            StoreError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                "Could not save. Storage is unavailable, please try again."
            }
            StoreError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                "Could not save. The post could not be encoded."
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
