//! The object manager: creation, the per-frame lifecycle passes and
//! destruction.
//!
//! Objects live in one `Vec` in creation order. Objects created since the
//! last frame sit at its tail; the `pending_init` count says how many. A frame
//! runs three passes over that vector:
//!
//! 1. **initialize** the pending tail, in creation order;
//! 2. **update** every older object not marked for destruction;
//! 3. **destroy** marked objects, then compact the vector (survivor order is
//!    preserved).
//!
//! Objects created from inside a hook are parked in the ledger and appended
//! after the update pass, so they are initialized next frame. Destruction
//! requests raised during the destroy pass are processed before the frame
//! ends.

use std::collections::HashMap;

use engine_connect::ConnectionsManager;
use tracing::{debug, info, warn};

use crate::context::{FrameInfo, Scope};
use crate::error::ObjectError;
use crate::id::{IdSequence, ObjectId};
use crate::object::{Object, ObjectBuilder, ObjectState};
use crate::resources::Resources;

/// Bookkeeping reachable from inside hooks: id allocation, the id to index
/// map, mid-frame spawns and destruction marks.
pub(crate) struct Ledger {
    ids: IdSequence,
    slots: HashMap<ObjectId, usize>,
    spawned: Vec<Object>,
    marked: Vec<ObjectId>,
    dying: Vec<ObjectId>,
    exit_requested: bool,
}

impl Ledger {
    fn new() -> Self {
        Self {
            ids: IdSequence::new(),
            slots: HashMap::new(),
            spawned: Vec::new(),
            marked: Vec::new(),
            dying: Vec::new(),
            exit_requested: false,
        }
    }

    pub(crate) fn spawn(&mut self, name: String, connections: &mut ConnectionsManager) -> &mut Object {
        let id = self.ids.next_id();
        debug!(object_id = %id, name = %name, "object spawned mid-frame");
        let index = self.spawned.len();
        self.spawned.push(Object::new(id, name, connections));
        &mut self.spawned[index]
    }

    pub(crate) fn mark(&mut self, id: ObjectId) -> Result<(), ObjectError> {
        if self.is_marked(id) {
            return Ok(());
        }
        let known = self.slots.contains_key(&id) || self.spawned.iter().any(|o| o.id() == id);
        if !known {
            warn!(object_id = %id, "destroy requested for unknown object");
            return Err(ObjectError::UnknownObject(id));
        }
        debug!(object_id = %id, "object marked for destruction");
        self.marked.push(id);
        Ok(())
    }

    pub(crate) fn is_marked(&self, id: ObjectId) -> bool {
        self.marked.contains(&id) || self.dying.contains(&id)
    }

    pub(crate) fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Moves parked spawns onto the end of `objects`. Returns how many moved.
    fn adopt(&mut self, objects: &mut Vec<Object>) -> usize {
        let spawned = std::mem::take(&mut self.spawned);
        let count = spawned.len();
        for object in spawned {
            self.slots.insert(object.id(), objects.len());
            objects.push(object);
        }
        count
    }

    fn reindex(&mut self, objects: &[Object]) {
        self.slots.clear();
        for (index, object) in objects.iter().enumerate() {
            self.slots.insert(object.id(), index);
        }
    }
}

/// What one call to [`ObjectManager::process_frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    /// Objects whose components received `initialize`.
    pub initialized: usize,
    /// Objects whose components received `update`.
    pub updated: usize,
    /// Objects created from inside hooks during this frame.
    pub spawned: usize,
    /// Objects torn down and removed.
    pub destroyed: usize,
    /// Objects alive after the frame.
    pub live: usize,
}

/// Owns every object of one world and drives their lifecycle.
pub struct ObjectManager {
    objects: Vec<Object>,
    ledger: Ledger,
    pending_init: usize,
    frame: u64,
}

impl ObjectManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            ledger: Ledger::new(),
            pending_init: 0,
            frame: 0,
        }
    }

    /// Creates an object and returns a builder for attaching its components.
    ///
    /// The object is live immediately (its ports can be linked) and is
    /// initialized by the next [`process_frame`](Self::process_frame) or
    /// [`initialize_objects`](Self::initialize_objects).
    pub fn create_object<'a>(
        &'a mut self,
        connections: &'a mut ConnectionsManager,
        name: impl Into<String>,
    ) -> ObjectBuilder<'a> {
        let id = self.ledger.ids.next_id();
        let name = name.into();
        debug!(object_id = %id, name = %name, "object created");
        let index = self.objects.len();
        self.ledger.slots.insert(id, index);
        self.objects.push(Object::new(id, name, connections));
        self.pending_init += 1;
        ObjectBuilder::new(&mut self.objects[index], connections)
    }

    /// Marks an object for destruction at the end of the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectError::UnknownObject`] if `id` is not live.
    pub fn destroy_object(&mut self, id: ObjectId) -> Result<(), ObjectError> {
        self.ledger.mark(id)
    }

    /// Startup pass: initializes every object created so far.
    ///
    /// Clears the pending count, so the first frame updates these objects
    /// rather than initializing them again. Returns how many were initialized.
    pub fn initialize_objects(
        &mut self,
        connections: &mut ConnectionsManager,
        resources: &mut Resources,
    ) -> usize {
        let Self {
            objects,
            ledger,
            pending_init,
            ..
        } = self;
        let mut scope = Scope {
            info: FrameInfo::default(),
            connections,
            ledger,
            resources,
        };

        let mut initialized = 0;
        for object in objects
            .iter_mut()
            .filter(|o| o.state() == ObjectState::PendingInit)
        {
            object.initialize(&mut scope);
            initialized += 1;
        }
        *pending_init = scope.ledger.adopt(objects);

        info!(initialized, pending = *pending_init, "objects initialized");
        initialized
    }

    /// Runs one frame of the lifecycle: initialize, update, destroy.
    pub fn process_frame(
        &mut self,
        connections: &mut ConnectionsManager,
        resources: &mut Resources,
        delta_time: f32,
    ) -> FrameReport {
        self.frame += 1;
        let frame = self.frame;
        let Self {
            objects,
            ledger,
            pending_init,
            ..
        } = self;
        let mut scope = Scope {
            info: FrameInfo { frame, delta_time },
            connections,
            ledger,
            resources,
        };
        let mut report = FrameReport {
            frame,
            ..FrameReport::default()
        };

        let first_fresh = objects.len() - *pending_init;
        for object in &mut objects[first_fresh..] {
            object.initialize(&mut scope);
        }
        report.initialized = *pending_init;
        *pending_init = 0;

        for object in &mut objects[..first_fresh] {
            if scope.ledger.is_marked(object.id()) {
                continue;
            }
            object.update(&mut scope);
            report.updated += 1;
        }

        report.spawned = scope.ledger.adopt(objects);
        *pending_init = report.spawned;

        while !scope.ledger.marked.is_empty() {
            report.destroyed += Self::destroy_marked(objects, pending_init, &mut scope);
            let adopted = scope.ledger.adopt(objects);
            report.spawned += adopted;
            *pending_init += adopted;
        }

        report.live = objects.len();
        report
    }

    /// One destroy pass over the currently marked objects.
    fn destroy_marked(
        objects: &mut Vec<Object>,
        pending_init: &mut usize,
        scope: &mut Scope<'_>,
    ) -> usize {
        let marked = std::mem::take(&mut scope.ledger.marked);
        let (doomed, survivors): (Vec<Object>, Vec<Object>) = std::mem::take(objects)
            .into_iter()
            .partition(|object| marked.contains(&object.id()));
        *objects = survivors;
        scope.ledger.dying = marked;

        let destroyed = doomed.len();
        for mut object in doomed {
            if object.state() == ObjectState::PendingInit {
                // Never destroyed without having been initialized.
                object.initialize(scope);
                *pending_init -= 1;
            }
            object.destroy(scope);
        }

        scope.ledger.dying.clear();
        scope.ledger.reindex(objects);
        destroyed
    }

    /// Shutdown pass: tears down every object and empties the manager.
    ///
    /// Pending objects are initialized first. Objects created by hooks during
    /// teardown are dropped without hooks. Returns how many were destroyed.
    pub fn destroy_objects(
        &mut self,
        connections: &mut ConnectionsManager,
        resources: &mut Resources,
    ) -> usize {
        let Self {
            objects,
            ledger,
            pending_init,
            frame,
        } = self;
        ledger.marked.clear();
        ledger.dying = objects.iter().map(Object::id).collect();
        let mut scope = Scope {
            info: FrameInfo {
                frame: *frame,
                delta_time: 0.0,
            },
            connections,
            ledger,
            resources,
        };

        let destroyed = objects.len();
        for mut object in objects.drain(..) {
            if object.state() == ObjectState::PendingInit {
                object.initialize(&mut scope);
            }
            object.destroy(&mut scope);
        }

        let orphans = std::mem::take(&mut scope.ledger.spawned);
        if !orphans.is_empty() {
            warn!(count = orphans.len(), "objects created during teardown were discarded");
        }
        for orphan in orphans {
            orphan.discard(scope.connections);
        }

        scope.ledger.slots.clear();
        scope.ledger.marked.clear();
        scope.ledger.dying.clear();
        *pending_init = 0;

        info!(destroyed, "all objects destroyed");
        destroyed
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.ledger
            .slots
            .get(&id)
            .and_then(|&index| self.objects.get(index))
    }

    #[must_use]
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.ledger
            .slots
            .get(&id)
            .and_then(|&index| self.objects.get_mut(index))
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.ledger.slots.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Live objects in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().map(Object::id)
    }

    /// Objects waiting for their first initialization.
    #[must_use]
    pub fn pending_init_count(&self) -> usize {
        self.pending_init
    }

    #[must_use]
    pub fn is_marked(&self, id: ObjectId) -> bool {
        self.ledger.is_marked(id)
    }

    /// Frames processed so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Returns whether a hook asked the world to exit, clearing the request.
    pub fn take_exit_request(&mut self) -> bool {
        std::mem::take(&mut self.ledger.exit_requested)
    }
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObjectManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectManager")
            .field("objects", &self.objects.len())
            .field("pending_init", &self.pending_init)
            .field("marked", &self.ledger.marked.len())
            .field("frame", &self.frame)
            .finish()
    }
}
