use crate::types::SemanticLock;
use strand_core::StrandError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum LockError {
    #[error("lock target conflicts with an existing claim")]
    Conflict {
        conflicting_lock: Option<Box<SemanticLock>>,
    },
    #[error("not the lock holder")]
    NotOwner,
    #[error("lock not found")]
    NotFound,
}

impl From<LockError> for StrandError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Conflict { conflicting_lock } => StrandError::Conflict(
                conflicting_lock
                    .map(|l| format!("held by {} on {:?}", l.holder_name, l.target))
                    .unwrap_or_else(|| "overlapping intent wins arbitration".into()),
            ),
            LockError::NotOwner => StrandError::NotOwner,
            LockError::NotFound => StrandError::NotFound("lock".into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LockError>;
