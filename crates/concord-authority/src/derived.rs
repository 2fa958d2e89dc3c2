//! Derived authorities - pure functions of other authorities

use std::convert::Infallible;

use concord_core::CombinedInputs;
use concord_flow::{Combiner, RelayConfig, SemanticBrander, Selector, Source, ValueSelector};

use crate::authority::{spawn_authority, Wiring};
use crate::{AuthorityConfig, AuthorityHandle};

/// Handle to a derived authority; it accepts no events
pub type DerivedAuthority<O> = AuthorityHandle<Infallible, O>;

/// Spawn a derived authority over `sources`.
///
/// Output carries the merged input version unchanged, tagged with the
/// authority's own token.
pub fn spawn_derived<V, O, C, S>(sources: Vec<Source<V>>, selector: S, config: AuthorityConfig) -> DerivedAuthority<O>
where
    V: Clone + Send + Sync + 'static,
    O: Clone + Send + 'static,
    C: Default + Send + 'static,
    S: Selector<CombinedInputs<V>, O, C>,
{
    spawn_authority(config, move |stage, ctx| {
        let publisher = stage.spawn_publisher::<_, O>(ctx);
        let brander = ctx.spawn(
            SemanticBrander::<O>::new(stage.id, RelayConfig::to(publisher.recipient())),
            stage.options("brander"),
        );
        let selector = ctx.spawn(
            ValueSelector::<CombinedInputs<V>, O, C, S>::new(selector, RelayConfig::to(brander.recipient())),
            stage.options("selector"),
        );
        let combiner = ctx.spawn(
            Combiner::new(sources, stage.combiner_config(selector.recipient())),
            stage.options("combiner"),
        );

        Wiring {
            publisher,
            events: None,
            inputs: Some(combiner.recipient()),
        }
    })
}
