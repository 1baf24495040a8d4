use strand_core::StrandError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum NetError {
    #[error("content not found")]
    NotFound,
    #[error("decode failure: {0}")]
    Corrupted(String),
}

impl From<NetError> for StrandError {
    fn from(err: NetError) -> Self {
        match err {
            NetError::NotFound => StrandError::NotFound("content".into()),
            NetError::Corrupted(msg) => StrandError::Corrupted(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, NetError>;
