//! Objects and the builder used to populate them.
//!
//! An [`Object`] is an id, a name, a root [`Transform`] and an ordered list of
//! components. Objects are only ever created through the object manager (or a
//! [`FrameContext`](crate::FrameContext) during a frame), which hands back an
//! [`ObjectBuilder`] for attaching components in the same call.

use engine_connect::{ComponentId, ConnectionsManager, PortError, PortId, PortRegistrar, PropertyOut};
use engine_math::{Quat, Transform, Vec3};
use tracing::{debug, trace};

use crate::component::Component;
use crate::context::Scope;
use crate::id::ObjectId;

/// Where an object is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Created, waiting for the next initialization pass.
    PendingInit,
    /// Initialized; receives `update` every frame.
    Active,
}

struct ComponentSlot {
    id: ComponentId,
    component: Box<dyn Component>,
}

/// A named container of components with a root transform.
pub struct Object {
    id: ObjectId,
    name: String,
    state: ObjectState,
    root_owner: ComponentId,
    root: PropertyOut<Transform>,
    components: Vec<ComponentSlot>,
}

impl Object {
    pub(crate) fn new(id: ObjectId, name: String, connections: &mut ConnectionsManager) -> Self {
        let root_owner = connections.register_component();
        let root = PropertyOut::new(&mut connections.registrar(root_owner), Transform::IDENTITY);
        Self {
            id,
            name,
            state: ObjectState::PendingInit,
            root_owner,
            root,
            components: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn state(&self) -> ObjectState {
        self.state
    }

    /// Port id of the root transform output. Components that follow this
    /// object link a `PropertyIn<Transform>` to it.
    #[must_use]
    pub fn root_port(&self) -> PortId {
        self.root.id()
    }

    /// Current root transform.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Busy`] while the root is being updated.
    pub fn transform(&self) -> Result<Transform, PortError> {
        self.root.get()
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.root.set(transform);
    }

    /// # Errors
    ///
    /// Returns [`PortError::Busy`] while the root is being updated.
    pub fn position(&self) -> Result<Vec3, PortError> {
        self.root.with(|t| t.position)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.root.update(|t| t.position = position);
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.root.update(|t| t.translate(offset));
    }

    /// Rotates by XYZ euler angles in radians.
    pub fn rotate(&mut self, euler: Vec3) {
        self.root.update(|t| t.rotate_euler(euler));
    }

    /// # Errors
    ///
    /// Returns [`PortError::Busy`] while the root is being updated.
    pub fn rotation(&self) -> Result<Quat, PortError> {
        self.root.with(|t| t.rotation)
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.root.update(|t| t.scale = scale);
    }

    /// First component of concrete type `T`.
    #[must_use]
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.components
            .iter()
            .find_map(|slot| slot.component.downcast_ref::<T>())
    }

    /// First component of concrete type `T`, mutably.
    #[must_use]
    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find_map(|slot| slot.component.downcast_mut::<T>())
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Port owner ids of the components, in attach order.
    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.iter().map(|slot| slot.id)
    }

    fn push_component<T: Component>(&mut self, id: ComponentId, component: T) -> &mut T {
        let index = self.components.len();
        self.components.push(ComponentSlot {
            id,
            component: Box::new(component),
        });
        match self.components[index].component.downcast_mut::<T>() {
            Some(component) => component,
            None => unreachable!("slot {index} was just filled with a {}", std::any::type_name::<T>()),
        }
    }

    pub(crate) fn initialize(&mut self, scope: &mut Scope<'_>) {
        let Self {
            id, root, components, ..
        } = self;
        for slot in components.iter_mut() {
            trace!(object_id = %id, component = slot.component.name(), "initialize");
            let mut ctx = scope.context(*id, slot.id, root);
            slot.component.initialize(&mut ctx);
        }
        self.state = ObjectState::Active;
        debug!(object_id = %self.id, name = %self.name, components = self.components.len(), "object initialized");
    }

    pub(crate) fn update(&mut self, scope: &mut Scope<'_>) {
        let Self {
            id, root, components, ..
        } = self;
        for slot in components.iter_mut() {
            let mut ctx = scope.context(*id, slot.id, root);
            slot.component.update(&mut ctx);
        }
    }

    /// Tears the object down: per component, unlink and unregister its ports
    /// and then run its `destroy` hook. The root port goes last.
    pub(crate) fn destroy(self, scope: &mut Scope<'_>) {
        let Self {
            id,
            name,
            root_owner,
            root,
            components,
            ..
        } = self;
        for ComponentSlot { id: owner, mut component } in components {
            let released = scope.connections.release_component(owner);
            trace!(object_id = %id, component = component.name(), released, "destroy");
            let mut ctx = scope.context(id, owner, &root);
            component.destroy(&mut ctx);
        }
        scope.connections.release_component(root_owner);
        debug!(object_id = %id, name = %name, "object destroyed");
    }

    /// Drops the object without running any hooks, releasing its ports.
    pub(crate) fn discard(self, connections: &mut ConnectionsManager) {
        for slot in &self.components {
            connections.release_component(slot.id);
        }
        connections.release_component(self.root_owner);
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("components", &self.components.len())
            .finish()
    }
}

/// Attaches components to a freshly created object.
///
/// Returned by `create_object`; drop it when the object is complete.
pub struct ObjectBuilder<'a> {
    object: &'a mut Object,
    connections: &'a mut ConnectionsManager,
}

impl<'a> ObjectBuilder<'a> {
    pub(crate) fn new(object: &'a mut Object, connections: &'a mut ConnectionsManager) -> Self {
        Self {
            object,
            connections,
        }
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.object.id
    }

    #[must_use]
    pub fn root_port(&self) -> PortId {
        self.object.root_port()
    }

    /// Builds a component with a port registrar scoped to it and attaches it.
    ///
    /// Returns the attached component so the caller can read its port ids.
    pub fn add_component<T: Component>(
        &mut self,
        build: impl FnOnce(&mut PortRegistrar<'_>) -> T,
    ) -> &mut T {
        let owner = self.connections.register_component();
        let component = build(&mut self.connections.registrar(owner));
        debug!(object_id = %self.object.id, component = component.name(), %owner, "component attached");
        self.object.push_component(owner, component)
    }

    /// Chaining form of [`add_component`](Self::add_component).
    #[must_use]
    pub fn with_component<T: Component>(
        mut self,
        build: impl FnOnce(&mut PortRegistrar<'_>) -> T,
    ) -> Self {
        self.add_component(build);
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.object.set_position(position);
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.object.set_transform(transform);
        self
    }

    /// Links two ports while the builder still holds the directory.
    ///
    /// # Errors
    ///
    /// Any [`PortError`] raised by [`ConnectionsManager::connect`].
    pub fn connect(&mut self, output: PortId, input: PortId) -> Result<(), PortError> {
        self.connections.connect(output, input)
    }

    #[must_use]
    pub fn object(&self) -> &Object {
        self.object
    }

    /// Finishes building and returns the object's id.
    #[must_use]
    pub fn build(self) -> ObjectId {
        self.object.id
    }
}
