//! Actor addresses and type-erased recipients

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use concord_core::{ActorId, ConcordError, ConcordResult};
use tokio::sync::mpsc;

/// Mailbox entry
pub(crate) enum Envelope<M> {
    Message(M),
    Stop,
}

/// Handle to an actor's mailbox
pub struct Address<M> {
    id: ActorId,
    tx: mpsc::UnboundedSender<Envelope<M>>,
}

impl<M> Clone for Address<M> {
    fn clone(&self) -> Self {
        Address {
            id: self.id,
            tx: self.tx.clone(),
        }
    }
}

impl<M> fmt::Debug for Address<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Address")
            .field("id", &self.id)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<M: Send + 'static> Address<M> {
    pub(crate) fn new(id: ActorId, tx: mpsc::UnboundedSender<Envelope<M>>) -> Self {
        Address { id, tx }
    }

    #[inline]
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Send a message. Messages to a stopped actor are dropped.
    pub fn dispatch(&self, message: M) {
        if self.tx.send(Envelope::Message(message)).is_err() {
            tracing::trace!(actor = %self.id, "dropped message for stopped actor");
        }
    }

    /// Send a message, reporting whether the mailbox was still open
    pub fn try_dispatch(&self, message: M) -> ConcordResult<()> {
        self.tx
            .send(Envelope::Message(message))
            .map_err(|_| ConcordError::MailboxClosed(self.id))
    }

    /// Queue a stop request behind every message already in the mailbox
    pub fn stop(&self) {
        let _ = self.tx.send(Envelope::Stop);
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the actor has finished its teardown
    pub async fn stopped(&self) {
        self.tx.closed().await
    }

    /// Recipient accepting any payload this actor's message type can be built from
    pub fn recipient<T>(&self) -> Recipient<T>
    where
        T: Send + 'static,
        M: From<T>,
    {
        self.recipient_map(M::from)
    }

    /// Recipient wrapping each payload into a message with `wrap`
    pub fn recipient_map<T, F>(&self, wrap: F) -> Recipient<T>
    where
        T: 'static,
        F: Fn(T) -> M + Send + Sync + 'static,
    {
        let tx = self.tx.clone();
        Recipient {
            id: self.id,
            deliver: Arc::new(move |payload| tx.send(Envelope::Message(wrap(payload))).is_ok()),
        }
    }

    pub(crate) fn stop_handle(&self) -> StopHandle {
        let tx = self.tx.clone();
        StopHandle {
            id: self.id,
            stop: Arc::new(move || {
                let _ = tx.send(Envelope::Stop);
            }),
        }
    }
}

/// Type-erased delivery target.
///
/// Identity is the receiving actor: two recipients built from the same
/// address compare equal regardless of how they wrap their payload.
pub struct Recipient<T> {
    id: ActorId,
    deliver: Arc<dyn Fn(T) -> bool + Send + Sync>,
}

impl<T: 'static> Recipient<T> {
    #[inline]
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Deliver a payload. Returns false if the receiving actor has stopped.
    pub fn deliver(&self, payload: T) -> bool {
        (self.deliver)(payload)
    }

    /// Recipient for another payload type, converted into this one on delivery
    pub fn map<U, F>(&self, f: F) -> Recipient<U>
    where
        U: 'static,
        F: Fn(U) -> T + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.deliver);
        Recipient {
            id: self.id,
            deliver: Arc::new(move |payload| inner(f(payload))),
        }
    }
}

impl<T> Clone for Recipient<T> {
    fn clone(&self) -> Self {
        Recipient {
            id: self.id,
            deliver: Arc::clone(&self.deliver),
        }
    }
}

impl<T> PartialEq for Recipient<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Recipient<T> {}

impl<T> Hash for Recipient<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Recipient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recipient({})", self.id)
    }
}

/// Type-erased stop request, used for parent-to-child teardown
#[derive(Clone)]
pub(crate) struct StopHandle {
    pub(crate) id: ActorId,
    stop: Arc<dyn Fn() + Send + Sync>,
}

impl StopHandle {
    pub(crate) fn stop(&self) {
        (self.stop)()
    }
}
