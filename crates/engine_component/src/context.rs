//! Per-hook access to the world.
//!
//! Every lifecycle hook receives a [`FrameContext`]. It identifies the calling
//! component and its object, and it is the only way a component reaches the
//! rest of the world: spawning and destroying objects, wiring ports, touching
//! resources. Sibling components are never reachable directly.

use engine_connect::{ComponentId, ConnectionsManager, PortError, PortId, PropertyOut};
use engine_math::Transform;

use crate::error::ObjectError;
use crate::id::ObjectId;
use crate::manager::Ledger;
use crate::object::ObjectBuilder;
use crate::resources::Resources;

/// Timing for the frame being processed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    /// 1-based frame number; 0 during world startup and teardown.
    pub frame: u64,
    /// Seconds since the previous frame.
    pub delta_time: f32,
}

/// Everything a lifecycle pass lends to the objects it visits.
pub(crate) struct Scope<'a> {
    pub(crate) info: FrameInfo,
    pub(crate) connections: &'a mut ConnectionsManager,
    pub(crate) ledger: &'a mut Ledger,
    pub(crate) resources: &'a mut Resources,
}

impl Scope<'_> {
    pub(crate) fn context<'s>(
        &'s mut self,
        object: ObjectId,
        component: ComponentId,
        root: &'s PropertyOut<Transform>,
    ) -> FrameContext<'s> {
        FrameContext {
            info: self.info,
            object,
            component,
            root,
            connections: &mut *self.connections,
            ledger: &mut *self.ledger,
            resources: &mut *self.resources,
        }
    }
}

/// The world as seen from inside one component hook.
pub struct FrameContext<'a> {
    info: FrameInfo,
    object: ObjectId,
    component: ComponentId,
    root: &'a PropertyOut<Transform>,
    connections: &'a mut ConnectionsManager,
    ledger: &'a mut Ledger,
    resources: &'a mut Resources,
}

impl FrameContext<'_> {
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.info.frame
    }

    #[must_use]
    pub fn delta_time(&self) -> f32 {
        self.info.delta_time
    }

    /// The object that owns the calling component.
    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        self.object
    }

    /// The calling component's port owner id.
    #[must_use]
    pub fn component_id(&self) -> ComponentId {
        self.component
    }

    /// Current root transform of the owning object.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Busy`] when called from inside
    /// [`update_transform`](Self::update_transform) of the same object.
    pub fn transform(&self) -> Result<Transform, PortError> {
        self.root.get()
    }

    /// Overwrites the owning object's root transform. Linked readers see the
    /// new value immediately.
    ///
    /// Returns `false` (the write is skipped with a warning) while the root
    /// is being read further up the stack.
    pub fn set_transform(&mut self, transform: Transform) -> bool {
        self.root.set(transform)
    }

    /// Applies `f` to the owning object's root transform in place.
    ///
    /// Returns `None` if the root is busy.
    pub fn update_transform<R>(&mut self, f: impl FnOnce(&mut Transform) -> R) -> Option<R> {
        self.root.update(f)
    }

    /// Port id of the owning object's root transform output.
    #[must_use]
    pub fn root_port(&self) -> PortId {
        self.root.id()
    }

    /// Creates a new object from inside a frame.
    ///
    /// The object joins the live collection at the end of the current pass
    /// and is initialized at the start of the next frame.
    pub fn create_object(&mut self, name: impl Into<String>) -> ObjectBuilder<'_> {
        let object = self.ledger.spawn(name.into(), &mut *self.connections);
        ObjectBuilder::new(object, &mut *self.connections)
    }

    /// Marks an object for destruction at the end of the current frame.
    ///
    /// Marking the same object twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectError::UnknownObject`] if `id` names no live or
    /// pending object.
    pub fn destroy_object(&mut self, id: ObjectId) -> Result<(), ObjectError> {
        self.ledger.mark(id)
    }

    /// Whether `id` is marked for destruction this frame.
    #[must_use]
    pub fn is_marked(&self, id: ObjectId) -> bool {
        self.ledger.is_marked(id)
    }

    /// Links an output port to an input port.
    ///
    /// # Errors
    ///
    /// Any [`PortError`] raised by [`ConnectionsManager::connect`].
    pub fn connect(&mut self, output: PortId, input: PortId) -> Result<(), PortError> {
        self.connections.connect(output, input)
    }

    /// Removes every link touching `port`, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnknownPort`] if `port` is not registered.
    pub fn disconnect(&mut self, port: PortId) -> Result<usize, PortError> {
        self.connections.disconnect(port)
    }

    /// Read access to the port directory.
    #[must_use]
    pub fn connections(&self) -> &ConnectionsManager {
        &*self.connections
    }

    #[must_use]
    pub fn resource<T: 'static>(&self) -> Option<&T> {
        self.resources.get::<T>()
    }

    pub fn resource_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources.get_mut::<T>()
    }

    /// Asks the frame driver to stop after the current frame.
    pub fn request_exit(&mut self) {
        self.ledger.request_exit();
    }
}

impl std::fmt::Debug for FrameContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameContext")
            .field("frame", &self.info.frame)
            .field("object", &self.object)
            .field("component", &self.component)
            .finish_non_exhaustive()
    }
}
