//! Message ports: synchronous typed event broadcast.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::endpoint::{Handler, MessageFanout, MessageSink, Subscribers};
use crate::manager::PortRegistrar;
use crate::port::{Direction, ElementType, PortId, PortKind};

/// Fires events of type `T` to every linked [`MessageIn`].
pub struct MessageOut<T> {
    id: PortId,
    subscribers: Subscribers<T>,
}

impl<T: 'static> MessageOut<T> {
    /// Register a new output with no subscribers.
    pub fn new(ports: &mut PortRegistrar<'_>) -> Self {
        let subscribers: Subscribers<T> = Rc::new(RefCell::new(Vec::new()));
        let id = ports.register(
            Direction::Out,
            PortKind::Message,
            ElementType::of::<T>(),
            Rc::new(MessageFanout(Rc::clone(&subscribers))),
        );
        Self { id, subscribers }
    }

    /// Directory id of this port.
    #[must_use]
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Deliver `event` to every linked input before returning.
    ///
    /// Firing with no subscribers is a no-op. Returns the number of handlers
    /// that ran.
    pub fn fire(&self, event: &T) -> usize {
        // Snapshot so handlers can't invalidate the list mid-delivery.
        let handlers: Vec<Handler<T>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();

        let mut delivered = 0;
        for handler in &handlers {
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    let handler: &mut dyn FnMut(&T) = &mut *handler;
                    handler(event);
                    delivered += 1;
                }
                Err(_) => warn!(port = self.id.0, "skipped re-entrant message handler"),
            }
        }
        delivered
    }

    /// Number of inputs currently linked.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<T> fmt::Debug for MessageOut<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageOut")
            .field("id", &self.id)
            .field("element", &std::any::type_name::<T>())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

/// Receives events of type `T` through a handler closure.
///
/// The handler runs synchronously inside [`MessageOut::fire`]. Components that
/// need to act on events later typically have the handler write into shared
/// state (`Rc<Cell<_>>` / `Rc<RefCell<_>>`) they inspect in `update`.
pub struct MessageIn<T> {
    id: PortId,
    _handler: Handler<T>,
}

impl<T: 'static> MessageIn<T> {
    /// Register a new input that calls `handler` for every delivered event.
    pub fn new(ports: &mut PortRegistrar<'_>, handler: impl FnMut(&T) + 'static) -> Self {
        let handler: Handler<T> = Rc::new(RefCell::new(handler));
        let id = ports.register(
            Direction::In,
            PortKind::Message,
            ElementType::of::<T>(),
            Rc::new(MessageSink(Rc::clone(&handler))),
        );
        Self {
            id,
            _handler: handler,
        }
    }

    /// Directory id of this port.
    #[must_use]
    pub fn id(&self) -> PortId {
        self.id
    }
}

impl<T> fmt::Debug for MessageIn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageIn")
            .field("id", &self.id)
            .field("element", &std::any::type_name::<T>())
            .finish()
    }
}
