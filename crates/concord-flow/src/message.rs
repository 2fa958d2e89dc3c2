//! Message contract shared by the primitives

use concord_core::Snapshot;
use concord_runtime::Recipient;

/// Anything that accepts snapshots of `V`
pub type Destination<V> = Recipient<Snapshot<V>>;

/// Relay-family input: a snapshot of `I`, or a change of the single
/// forwarding target, which receives snapshots of `O`
pub enum RelayMessage<I, O = I> {
    Snapshot(Snapshot<I>),
    SetDestination(Destination<O>),
    UnsetDestination,
}

impl<I, O> From<Snapshot<I>> for RelayMessage<I, O> {
    fn from(snapshot: Snapshot<I>) -> Self {
        RelayMessage::Snapshot(snapshot)
    }
}

/// Publisher-family input
pub enum PublisherMessage<V> {
    Snapshot(Snapshot<V>),
    Subscribe(Destination<V>),
    Unsubscribe(Destination<V>),
}

impl<V> From<Snapshot<V>> for PublisherMessage<V> {
    fn from(snapshot: Snapshot<V>) -> Self {
        PublisherMessage::Snapshot(snapshot)
    }
}

/// Subscription change requested of a source
pub enum SubscriptionRequest<V> {
    Subscribe(Destination<V>),
    Unsubscribe(Destination<V>),
}

impl<V> From<SubscriptionRequest<V>> for PublisherMessage<V> {
    fn from(request: SubscriptionRequest<V>) -> Self {
        match request {
            SubscriptionRequest::Subscribe(d) => PublisherMessage::Subscribe(d),
            SubscriptionRequest::Unsubscribe(d) => PublisherMessage::Unsubscribe(d),
        }
    }
}

/// Subscription control for an input stage whose sources are wired by
/// the caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connection {
    /// Subscribe to every declared source
    Connect,
    /// Unsubscribe from every declared source
    Disconnect,
}
