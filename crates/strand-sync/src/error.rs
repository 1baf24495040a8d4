use strand_core::StrandError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SyncError {
    #[error("downstream collaborator unavailable: {0}")]
    Unavailable(String),
}

impl From<SyncError> for StrandError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Unavailable(msg) => StrandError::Unavailable(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
