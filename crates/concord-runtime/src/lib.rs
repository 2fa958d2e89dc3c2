//! Concord Runtime - Actor substrate
//!
//! Every Concord component is an actor: one tokio task owning one unbounded
//! FIFO mailbox. This crate provides exactly the substrate the components
//! rely on:
//! 1. `spawn` an actor (optionally as a child of another)
//! 2. `dispatch` a message (fire-and-forget)
//! 3. `stop` an actor (runs its teardown hook, then stops its children)
//!
//! A handler may `.await` freely; the next message is not started until the
//! current one has been fully processed.

pub mod actor;
pub mod address;
pub mod telemetry;

pub use actor::*;
pub use address::*;
