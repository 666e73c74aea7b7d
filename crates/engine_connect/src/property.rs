//! Property ports: a current value published by one side and read by others.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::endpoint::{PropertyLink, PropertySlot, PropertySource};
use crate::error::PortError;
use crate::manager::PortRegistrar;
use crate::port::{Direction, ElementType, PortId, PortKind};

/// Publishes a value of type `T`.
///
/// Writes are visible to every linked [`PropertyIn`] immediately; there is no
/// history and no per-frame buffering.
pub struct PropertyOut<T> {
    id: PortId,
    value: Rc<RefCell<T>>,
}

impl<T: 'static> PropertyOut<T> {
    /// Register a new output holding `initial`.
    pub fn new(ports: &mut PortRegistrar<'_>, initial: T) -> Self {
        let value = Rc::new(RefCell::new(initial));
        let id = ports.register(
            Direction::Out,
            PortKind::Property,
            ElementType::of::<T>(),
            Rc::new(PropertySource(Rc::clone(&value))),
        );
        Self { id, value }
    }

    /// Directory id of this port.
    #[must_use]
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Replace the published value.
    ///
    /// Skipped with a warning (returning `false`) while the value is borrowed
    /// further up the stack, e.g. from inside a reader's `with` closure.
    pub fn set(&self, value: T) -> bool {
        match self.value.try_borrow_mut() {
            Ok(mut slot) => {
                *slot = value;
                true
            }
            Err(_) => {
                warn!(port = self.id.0, "skipped write to a busy property");
                false
            }
        }
    }

    /// Modify the published value in place.
    ///
    /// Returns `None` (and logs a warning) if the value is busy.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        match self.value.try_borrow_mut() {
            Ok(mut value) => Some(f(&mut *value)),
            Err(_) => {
                warn!(port = self.id.0, "skipped update of a busy property");
                None
            }
        }
    }

    /// Inspect the published value without cloning it.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Busy`] while an `update` of this port is running.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, PortError> {
        let value = self.value.try_borrow().map_err(|_| PortError::Busy(self.id))?;
        Ok(f(&*value))
    }
}

impl<T: Clone + 'static> PropertyOut<T> {
    /// A copy of the published value.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Busy`] while an `update` of this port is running.
    pub fn get(&self) -> Result<T, PortError> {
        self.with(T::clone)
    }
}

impl<T> fmt::Debug for PropertyOut<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyOut")
            .field("id", &self.id)
            .field("element", &std::any::type_name::<T>())
            .finish()
    }
}

/// Reads the value of the [`PropertyOut`] it is linked to.
///
/// Reading an unlinked input is a wiring defect and returns
/// [`PortError::Unconnected`]; check [`PropertyIn::is_connected`] first when
/// the link is optional.
pub struct PropertyIn<T> {
    id: PortId,
    link: PropertyLink<T>,
}

impl<T: 'static> PropertyIn<T> {
    /// Register a new, unlinked input.
    pub fn new(ports: &mut PortRegistrar<'_>) -> Self {
        let link: PropertyLink<T> = Rc::new(RefCell::new(None));
        let id = ports.register(
            Direction::In,
            PortKind::Property,
            ElementType::of::<T>(),
            Rc::new(PropertySlot(Rc::clone(&link))),
        );
        Self { id, link }
    }

    /// Directory id of this port.
    #[must_use]
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Returns `true` while a source is linked.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.link.borrow().is_some()
    }

    /// Inspect the source's current value without cloning it.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unconnected`] if no source is linked and
    /// [`PortError::Busy`] while the source is being written.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, PortError> {
        // Released before `f` runs so the closure may rewire this input.
        let source = self
            .link
            .borrow()
            .as_ref()
            .map(Rc::clone)
            .ok_or(PortError::Unconnected(self.id))?;
        let value = source.try_borrow().map_err(|_| PortError::Busy(self.id))?;
        Ok(f(&*value))
    }
}

impl<T: Clone + 'static> PropertyIn<T> {
    /// A copy of the source's current value.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unconnected`] if no source is linked and
    /// [`PortError::Busy`] while the source is being written.
    pub fn get(&self) -> Result<T, PortError> {
        self.with(T::clone)
    }
}

impl<T> fmt::Debug for PropertyIn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyIn")
            .field("id", &self.id)
            .field("element", &std::any::type_name::<T>())
            .field("connected", &self.link.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConnectionsManager;

    #[test]
    fn test_unlinked_read_is_an_error() {
        let mut connections = ConnectionsManager::new();
        let owner = connections.register_component();
        let input = PropertyIn::<i32>::new(&mut connections.registrar(owner));
        assert!(!input.is_connected());
        assert_eq!(input.get(), Err(PortError::Unconnected(input.id())));
    }

    #[test]
    fn test_write_is_visible_immediately() {
        let mut connections = ConnectionsManager::new();
        let producer = connections.register_component();
        let consumer = connections.register_component();
        let out = PropertyOut::new(&mut connections.registrar(producer), 0_i32);
        let input = PropertyIn::<i32>::new(&mut connections.registrar(consumer));
        connections.connect(out.id(), input.id()).unwrap();

        assert!(out.set(42));
        assert_eq!(input.get(), Ok(42));
        assert_eq!(out.update(|v| *v += 1), Some(()));
        assert_eq!(input.get(), Ok(43));
        assert_eq!(out.get(), Ok(43));
    }

    #[test]
    fn test_with_borrows_without_clone() {
        let mut connections = ConnectionsManager::new();
        let owner = connections.register_component();
        let mut ports = connections.registrar(owner);
        let out = PropertyOut::new(&mut ports, vec![1, 2, 3]);
        let input = PropertyIn::<Vec<i32>>::new(&mut ports);
        connections.connect(out.id(), input.id()).unwrap();

        assert_eq!(input.with(Vec::len), Ok(3));
        assert_eq!(out.with(|v| v.iter().sum::<i32>()), Ok(6));
    }

    #[test]
    fn test_write_while_reader_borrows_is_skipped() {
        let mut connections = ConnectionsManager::new();
        let owner = connections.register_component();
        let mut ports = connections.registrar(owner);
        let out = PropertyOut::new(&mut ports, 1_i32);
        let input = PropertyIn::<i32>::new(&mut ports);
        connections.connect(out.id(), input.id()).unwrap();

        // Writing to the source from inside a read of it.
        let written = input.with(|_| out.set(2)).unwrap();
        assert!(!written);
        assert_eq!(input.with(|_| out.update(|v| *v = 3)), Ok(None));
        assert_eq!(out.get(), Ok(1));

        // Reading from inside an update of the source.
        let read = out.update(|_| (input.get(), out.get())).unwrap();
        assert_eq!(read, (Err(PortError::Busy(input.id())), Err(PortError::Busy(out.id()))));

        assert!(out.set(4));
        assert_eq!(input.get(), Ok(4));
    }

    #[test]
    fn test_reader_may_disconnect_itself_while_reading() {
        let mut connections = ConnectionsManager::new();
        let owner = connections.register_component();
        let mut ports = connections.registrar(owner);
        let out = PropertyOut::new(&mut ports, 5_i32);
        let input = PropertyIn::<i32>::new(&mut ports);
        connections.connect(out.id(), input.id()).unwrap();

        let removed = input.with(|v| (*v, connections.disconnect(input.id()))).unwrap();
        assert_eq!(removed, (5, Ok(1)));
        assert_eq!(input.get(), Err(PortError::Unconnected(input.id())));
    }
}
