//! Concord Core - Fundamental types and primitives
//!
//! This crate defines the data model shared by every Concord component:
//! - Identity tokens (AuthorityId)
//! - Version vectors and the strict causal merge
//! - State snapshots and combined input objects
//! - Error types

pub mod id;
pub mod version;
pub mod snapshot;
pub mod combined;
pub mod error;

pub use id::*;
pub use version::*;
pub use snapshot::*;
pub use combined::*;
pub use error::*;
