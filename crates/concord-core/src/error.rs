//! Error types for Concord

use thiserror::Error;

use crate::{ActorId, AuthorityId};

/// Core Concord errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConcordError {
    // Causality errors
    #[error("Version conflict on {id}: held {held}, incoming {incoming}")]
    VersionConflict {
        id: AuthorityId,
        held: u64,
        incoming: u64,
    },

    // Delivery errors
    #[error("Mailbox closed: actor {0}")]
    MailboxClosed(ActorId),

    // Wiring errors
    #[error("Unknown source: {0}")]
    UnknownSource(AuthorityId),
}

/// Result type for Concord operations
pub type ConcordResult<T> = Result<T, ConcordError>;
