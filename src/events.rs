//! Synchronous, re-entrancy-safe event subscribers.
//!
//! Events are queued while an operation runs and dispatched once it has
//! finished, so handlers always observe a settled state. Handlers get mutable
//! access to the owning context and may emit further events, subscribe or
//! unsubscribe while a dispatch is in progress.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<C, E> = Rc<RefCell<dyn FnMut(&mut C, &E)>>;

struct Subscriber<C, E> {
    id: SubscriptionId,
    active: Rc<Cell<bool>>,
    handler: Handler<C, E>,
}

impl<C, E> Clone for Subscriber<C, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Rc::clone(&self.active),
            handler: Rc::clone(&self.handler),
        }
    }
}

/// Subscriber list plus the queue of events awaiting dispatch.
///
/// `C` is the context handed to handlers (the owner of the bus), `E` the
/// event type.
pub struct EventBus<C, E> {
    next_id: u64,
    subscribers: Vec<Subscriber<C, E>>,
    pending: VecDeque<E>,
    dispatching: bool,
}

impl<C, E> Default for EventBus<C, E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
            pending: VecDeque::new(),
            dispatching: false,
        }
    }
}

impl<C, E> fmt::Debug for EventBus<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending.len())
            .field("dispatching", &self.dispatching)
            .finish()
    }
}

impl<C, E> EventBus<C, E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler. It first runs for the next event dispatched after
    /// the current one.
    pub fn subscribe(&mut self, handler: impl FnMut(&mut C, &E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            active: Rc::new(Cell::new(true)),
            handler: Rc::new(RefCell::new(handler)),
        });
        id
    }

    /// Removes a handler. It is not invoked again, even for an event whose
    /// dispatch is in progress. Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(index) = self.subscribers.iter().position(|s| s.id == id) else {
            return false;
        };
        let subscriber = self.subscribers.remove(index);
        subscriber.active.set(false);
        true
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Queues an event for the next dispatch.
    pub fn emit(&mut self, event: E) {
        self.pending.push_back(event);
    }
}

/// Dispatches every queued event, in order, to the handlers registered when
/// each event is dispatched.
///
/// `bus` projects the context onto its event bus. A call made while a
/// dispatch is already running (from inside a handler) returns immediately;
/// the outer dispatch delivers whatever that handler queued.
pub fn dispatch_pending<C, E>(ctx: &mut C, bus: impl Fn(&mut C) -> &mut EventBus<C, E>) {
    if bus(ctx).dispatching {
        return;
    }
    bus(ctx).dispatching = true;

    while let Some(event) = bus(ctx).pending.pop_front() {
        let snapshot = bus(ctx).subscribers.clone();
        for subscriber in snapshot {
            if !subscriber.active.get() {
                continue;
            }
            if let Ok(mut handler) = subscriber.handler.try_borrow_mut() {
                (*handler)(ctx, &event);
            } else {
                tracing::trace!(id = ?subscriber.id, "handler already running, skipped");
            }
        }
    }

    bus(ctx).dispatching = false;
}
