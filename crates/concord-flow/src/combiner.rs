//! Combiner - glitch-free combination of named sources
//!
//! Keeps the latest snapshot of every declared source and emits the combined
//! value only when all sources have reported and their version vectors merge
//! without conflict. A conflict means some source has not yet caught up with
//! an upstream change another source already reflects; the emission is
//! withheld until it has.
//!
//! A combiner over zero sources has nothing to wait for: it emits one empty
//! combined value when it starts.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use concord_core::{AuthorityId, CombinedInputs, ConcordError, Snapshot, VersionVector};
use concord_runtime::{Actor, Address, Context};
use indexmap::IndexMap;

use crate::{Connection, Destination, PublisherMessage, Relay, RelayConfig, SubscriptionRequest};

/// A named input: the token its snapshots carry, and a way to
/// subscribe or unsubscribe a destination
pub struct Source<V> {
    id: AuthorityId,
    link: Arc<dyn Fn(SubscriptionRequest<V>) + Send + Sync>,
}

impl<V: 'static> Source<V> {
    pub fn new<F>(id: AuthorityId, link: F) -> Self
    where
        F: Fn(SubscriptionRequest<V>) + Send + Sync + 'static,
    {
        Source {
            id,
            link: Arc::new(link),
        }
    }

    /// Source backed by anything speaking the publisher protocol
    pub fn from_publisher(id: AuthorityId, address: Address<PublisherMessage<V>>) -> Self
    where
        V: Send,
    {
        Source::new(id, move |request: SubscriptionRequest<V>| address.dispatch(request.into()))
    }

    #[inline]
    pub fn id(&self) -> AuthorityId {
        self.id
    }

    pub fn subscribe(&self, destination: Destination<V>) {
        (self.link)(SubscriptionRequest::Subscribe(destination))
    }

    pub fn unsubscribe(&self, destination: Destination<V>) {
        (self.link)(SubscriptionRequest::Unsubscribe(destination))
    }

    /// Same source, values converted with `f` on the way to each subscriber
    pub fn map<U, F>(self, f: F) -> Source<U>
    where
        U: 'static,
        F: Fn(V) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let link = self.link;
        Source::new(self.id, move |request: SubscriptionRequest<U>| {
            let adapt = |destination: Destination<U>| {
                let f = Arc::clone(&f);
                destination.map(move |snapshot: Snapshot<V>| snapshot.map_value(|value| (*f)(value)))
            };
            match request {
                SubscriptionRequest::Subscribe(d) => link(SubscriptionRequest::Subscribe(adapt(d))),
                SubscriptionRequest::Unsubscribe(d) => link(SubscriptionRequest::Unsubscribe(adapt(d))),
            }
        })
    }
}

impl<V> Clone for Source<V> {
    fn clone(&self) -> Self {
        Source {
            id: self.id,
            link: Arc::clone(&self.link),
        }
    }
}

impl<V> fmt::Debug for Source<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source({})", self.id)
    }
}

/// Combiner configuration
#[derive(Clone, Debug)]
pub struct CombinerConfig<V> {
    /// Subscribe to every source on start. When false the combiner waits
    /// for [`Connection::Connect`].
    pub subscribe_on_start: bool,
    pub initial_destination: Option<Destination<CombinedInputs<V>>>,
}

impl<V> Default for CombinerConfig<V> {
    fn default() -> Self {
        CombinerConfig {
            subscribe_on_start: true,
            initial_destination: None,
        }
    }
}

pub enum CombinerMessage<V> {
    Snapshot(Snapshot<V>),
    SetDestination(Destination<CombinedInputs<V>>),
    UnsetDestination,
    Connection(Connection),
}

impl<V> From<Snapshot<V>> for CombinerMessage<V> {
    fn from(snapshot: Snapshot<V>) -> Self {
        CombinerMessage::Snapshot(snapshot)
    }
}

impl<V> From<Connection> for CombinerMessage<V> {
    fn from(connection: Connection) -> Self {
        CombinerMessage::Connection(connection)
    }
}

pub struct Combiner<V> {
    sources: Vec<Source<V>>,
    /// Latest snapshot per source, least recently received first
    latest: IndexMap<AuthorityId, Snapshot<V>>,
    relay: Relay<CombinedInputs<V>>,
    subscribe_on_start: bool,
    connected: bool,
}

impl<V: Clone + Send + 'static> Combiner<V> {
    /// Sources declared twice are kept once, at their first position
    pub fn new(sources: Vec<Source<V>>, config: CombinerConfig<V>) -> Self {
        let mut declared: Vec<Source<V>> = Vec::with_capacity(sources.len());
        for source in sources {
            if declared.iter().any(|s| s.id == source.id) {
                tracing::warn!(source = %source.id, "duplicate source ignored");
                continue;
            }
            declared.push(source);
        }

        Combiner {
            latest: IndexMap::with_capacity(declared.len()),
            sources: declared,
            relay: Relay::new(RelayConfig {
                initial_destination: config.initial_destination,
            }),
            subscribe_on_start: config.subscribe_on_start,
            connected: false,
        }
    }

    pub fn sources(&self) -> &[Source<V>] {
        &self.sources
    }

    fn connect(&mut self, ctx: &Context<CombinerMessage<V>>) {
        if self.connected {
            return;
        }
        self.connected = true;
        let me: Destination<V> = ctx.address().recipient();
        for source in &self.sources {
            tracing::debug!(source = %source.id, "subscribing");
            source.subscribe(me.clone());
        }
    }

    fn disconnect(&mut self, ctx: &Context<CombinerMessage<V>>) {
        if !self.connected {
            return;
        }
        self.connected = false;
        let me: Destination<V> = ctx.address().recipient();
        for source in &self.sources {
            tracing::debug!(source = %source.id, "unsubscribing");
            source.unsubscribe(me.clone());
        }
    }

    fn check_declared(&self, snapshot: &Snapshot<V>) -> Result<AuthorityId, Option<ConcordError>> {
        let id = snapshot.semantic.ok_or(None)?;
        if self.sources.iter().any(|source| source.id == id) {
            Ok(id)
        } else {
            Err(Some(ConcordError::UnknownSource(id)))
        }
    }

    /// Record a source snapshot; returns the combined snapshot when every
    /// source has reported and the latest versions are mutually consistent
    pub fn record(&mut self, snapshot: Snapshot<V>) -> Option<Snapshot<CombinedInputs<V>>> {
        let id = match self.check_declared(&snapshot) {
            Ok(id) => id,
            Err(Some(err)) => {
                tracing::warn!(%err, "snapshot ignored");
                return None;
            }
            Err(None) => {
                tracing::warn!("untagged snapshot ignored");
                return None;
            }
        };

        self.latest.shift_remove(&id);
        self.latest.insert(id, snapshot);

        if self.latest.len() < self.sources.len() {
            tracing::trace!(
                reported = self.latest.len(),
                declared = self.sources.len(),
                "waiting for all sources"
            );
            return None;
        }

        let version = match VersionVector::merged(self.latest.values().map(|s| &s.version)) {
            Ok(version) => version,
            Err(err) => {
                tracing::debug!(%err, "inconsistent inputs, emission withheld");
                return None;
            }
        };

        let inputs: CombinedInputs<V> = self
            .sources
            .iter()
            .filter_map(|source| {
                self.latest
                    .get(&source.id)
                    .map(|snapshot| (source.id, snapshot.value.clone()))
            })
            .collect();

        Some(Snapshot::anonymous(inputs, version))
    }
}

#[async_trait]
impl<V: Clone + Send + 'static> Actor for Combiner<V> {
    type Message = CombinerMessage<V>;

    async fn started(&mut self, ctx: &mut Context<CombinerMessage<V>>) {
        if self.sources.is_empty() {
            tracing::debug!("no sources, emitting empty inputs");
            self.relay
                .forward(Snapshot::anonymous(CombinedInputs::empty(), VersionVector::new()));
            return;
        }
        if self.subscribe_on_start {
            self.connect(ctx);
        }
    }

    async fn handle(&mut self, message: CombinerMessage<V>, ctx: &mut Context<CombinerMessage<V>>) {
        match message {
            CombinerMessage::Snapshot(snapshot) => {
                if let Some(combined) = self.record(snapshot) {
                    self.relay.forward(combined);
                }
            }
            CombinerMessage::SetDestination(destination) => self.relay.set_destination(destination),
            CombinerMessage::UnsetDestination => self.relay.unset_destination(),
            CombinerMessage::Connection(Connection::Connect) => self.connect(ctx),
            CombinerMessage::Connection(Connection::Disconnect) => self.disconnect(ctx),
        }
    }

    async fn stopping(&mut self, ctx: &mut Context<CombinerMessage<V>>) {
        self.disconnect(ctx);
    }
}
