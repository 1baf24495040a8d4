//! Domain error kinds (spec §7).
//!
//! One variant per named kind; the hot path never panics on these, it
//! surfaces or logs-and-degrades per the policy table in §7.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrandError {
    /// Lock target overlaps an existing Held lock or a winning peer intent.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Release attempted by a non-holder.
    #[error("not the lock holder")]
    NotOwner,

    /// Referenced lock/cid/doc absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Lock TTL passed.
    #[error("lock expired")]
    Expired,

    /// Audit/subscriber queue saturated.
    #[error("buffer full")]
    BufferFull,

    /// Downstream collaborator (embed, vector store, broadcast) failed.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Decode failure or CID mismatch.
    #[error("corrupted: {0}")]
    Corrupted(String),

    /// Scope cancellation.
    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, StrandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(StrandError::NotOwner.to_string(), "not the lock holder");
        assert_eq!(StrandError::Expired.to_string(), "lock expired");
    }
}
