use strand_core::StrandError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum EventError {
    #[error("no subscriber registered for agent")]
    NotSubscribed,
}

impl From<EventError> for StrandError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotSubscribed => StrandError::NotFound("subscriber".into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, EventError>;
