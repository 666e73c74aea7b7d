//! Type-erased views of port storage held by the directory.
//!
//! Each typed port keeps its own `Rc` to the shared storage; the directory
//! keeps a second handle behind [`Endpoint`] so it can bind and unbind ports
//! without knowing their element type. The only downcast happens in
//! [`Endpoint::attach`].

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::port::PortId;

/// A shared message handler.
pub(crate) type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// Subscribers of a message output, tagged with the input they came from.
pub(crate) type Subscribers<T> = Rc<RefCell<Vec<(PortId, Handler<T>)>>>;

/// The slot a property input reads through; `None` while unlinked.
pub(crate) type PropertyLink<T> = Rc<RefCell<Option<Rc<RefCell<T>>>>>;

pub(crate) trait Endpoint {
    fn as_any(&self) -> &dyn Any;

    /// Bind this input endpoint to `source`. Returns `false` when `source`
    /// does not carry the same payload.
    fn attach(&self, _source: &dyn Endpoint, _input: PortId) -> bool {
        false
    }

    /// Undo a previous [`Endpoint::attach`] to `source`.
    fn detach(&self, _source: &dyn Endpoint, _input: PortId) {}
}

/// Storage behind a `PropertyOut<T>`.
pub(crate) struct PropertySource<T>(pub(crate) Rc<RefCell<T>>);

impl<T: 'static> Endpoint for PropertySource<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Storage behind a `PropertyIn<T>`.
pub(crate) struct PropertySlot<T>(pub(crate) PropertyLink<T>);

impl<T: 'static> Endpoint for PropertySlot<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn attach(&self, source: &dyn Endpoint, _input: PortId) -> bool {
        match source.as_any().downcast_ref::<PropertySource<T>>() {
            Some(source) => {
                *self.0.borrow_mut() = Some(Rc::clone(&source.0));
                true
            }
            None => false,
        }
    }

    fn detach(&self, _source: &dyn Endpoint, _input: PortId) {
        self.0.borrow_mut().take();
    }
}

/// Storage behind a `MessageOut<T>`.
pub(crate) struct MessageFanout<T>(pub(crate) Subscribers<T>);

impl<T: 'static> Endpoint for MessageFanout<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Storage behind a `MessageIn<T>`.
pub(crate) struct MessageSink<T>(pub(crate) Handler<T>);

impl<T: 'static> Endpoint for MessageSink<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn attach(&self, source: &dyn Endpoint, input: PortId) -> bool {
        match source.as_any().downcast_ref::<MessageFanout<T>>() {
            Some(source) => {
                source.0.borrow_mut().push((input, Rc::clone(&self.0)));
                true
            }
            None => false,
        }
    }

    fn detach(&self, source: &dyn Endpoint, input: PortId) {
        if let Some(source) = source.as_any().downcast_ref::<MessageFanout<T>>() {
            source.0.borrow_mut().retain(|(id, _)| *id != input);
        }
    }
}
