//! Authority messages and handles

use std::fmt;

use concord_core::AuthorityId;
use concord_flow::{Connection, Destination, Source, SubscriptionRequest};
use concord_runtime::Address;

/// Everything an authority accepts from the outside
pub enum AuthorityMessage<E, O> {
    Subscribe(Destination<O>),
    Unsubscribe(Destination<O>),
    Event(E),
    /// Attach or detach the authority's inputs, for authorities spawned
    /// with `manage_own_subscriptions` off
    Connection(Connection),
}

impl<E, O> From<SubscriptionRequest<O>> for AuthorityMessage<E, O> {
    fn from(request: SubscriptionRequest<O>) -> Self {
        match request {
            SubscriptionRequest::Subscribe(d) => AuthorityMessage::Subscribe(d),
            SubscriptionRequest::Unsubscribe(d) => AuthorityMessage::Unsubscribe(d),
        }
    }
}

/// Handle to a running authority with event type `E` and output `O`
pub struct AuthorityHandle<E, O> {
    id: AuthorityId,
    address: Address<AuthorityMessage<E, O>>,
}

impl<E, O> Clone for AuthorityHandle<E, O> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            address: self.address.clone(),
        }
    }
}

impl<E, O> fmt::Debug for AuthorityHandle<E, O>
where
    E: Send + 'static,
    O: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorityHandle")
            .field("id", &self.id)
            .field("actor", &self.address.id())
            .finish()
    }
}

impl<E, O> AuthorityHandle<E, O>
where
    E: Send + 'static,
    O: Send + 'static,
{
    pub(crate) fn new(id: AuthorityId, address: Address<AuthorityMessage<E, O>>) -> Self {
        Self { id, address }
    }

    /// Token carried by every snapshot this authority emits
    #[inline]
    pub fn id(&self) -> AuthorityId {
        self.id
    }

    #[inline]
    pub fn address(&self) -> &Address<AuthorityMessage<E, O>> {
        &self.address
    }

    /// Subscribe a destination; it first receives the replay history
    pub fn subscribe(&self, destination: Destination<O>) {
        self.address.dispatch(AuthorityMessage::Subscribe(destination));
    }

    pub fn unsubscribe(&self, destination: Destination<O>) {
        self.address.dispatch(AuthorityMessage::Unsubscribe(destination));
    }

    pub fn dispatch_event(&self, event: E) {
        self.address.dispatch(AuthorityMessage::Event(event));
    }

    /// Subscribe the authority to its declared sources
    pub fn connect(&self) {
        self.address.dispatch(AuthorityMessage::Connection(Connection::Connect));
    }

    /// Unsubscribe the authority from its declared sources
    pub fn disconnect(&self) {
        self.address.dispatch(AuthorityMessage::Connection(Connection::Disconnect));
    }

    /// Stop the authority and, after it, its whole pipeline
    pub fn stop(&self) {
        self.address.stop();
    }

    /// Resolves once the authority actor has torn down
    pub async fn stopped(&self) {
        self.address.stopped().await
    }

    /// This authority as a combiner input
    pub fn source(&self) -> Source<O> {
        let address = self.address.clone();
        Source::new(self.id, move |request: SubscriptionRequest<O>| {
            address.dispatch(request.into())
        })
    }

    /// This authority as a combiner input of another value type
    pub fn source_map<V, F>(&self, f: F) -> Source<V>
    where
        V: 'static,
        F: Fn(O) -> V + Send + Sync + 'static,
    {
        self.source().map(f)
    }
}
