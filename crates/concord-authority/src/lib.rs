//! Concord Authority - Subscribable units of state
//!
//! An authority owns an identity token, a fixed pipeline of flow
//! primitives (spawned as its children) and a replaying publisher at the
//! end of that pipeline. Every authority is addressed the same way, through
//! [`AuthorityHandle`]:
//!
//! - Derived: Combiner → ValueSelector → SemanticBrander → ReplayPublisher
//! - Event: Combiner → ValueReducer → Distinct → Versioner → ReplayPublisher
//! - PureEvent: Event without inputs
//! - Open: PureEvent over replace/transform events
//! - ListSelection: Event over one list source, with a select event

pub mod config;
pub mod handle;
mod authority;
pub mod derived;
pub mod event;
pub mod open;
pub mod selection;

pub use config::*;
pub use handle::*;
pub use derived::*;
pub use event::*;
pub use open::*;
pub use selection::*;
