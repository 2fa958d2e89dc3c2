//! Concord Flow - Snapshot pipeline primitives
//!
//! Every primitive is an actor wrapping an embedded [`Relay`] or
//! [`Publisher`]:
//! - Relay, Mapper: forwarding and value transformation
//! - Distinct: suppression of unchanged snapshots
//! - SemanticBrander, Versioner: identity and version stamping
//! - Publisher, ReplayPublisher: fan-out with optional history replay
//! - Combiner: glitch-free combination of named sources
//! - ValueSelector, ValueReducer: derivation of authority values

pub mod message;
pub mod relay;
pub mod mapper;
pub mod distinct;
pub mod stamp;
pub mod publisher;
pub mod replay;
pub mod combiner;
pub mod selector;
pub mod reducer;

#[cfg(test)]
pub(crate) mod testkit;

pub use message::*;
pub use relay::*;
pub use mapper::*;
pub use distinct::*;
pub use stamp::*;
pub use publisher::*;
pub use replay::*;
pub use combiner::*;
pub use selector::*;
pub use reducer::*;
