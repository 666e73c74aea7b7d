//! The demo scene: a spinning beacon, an orbiting satellite that trips a trigger
//! volume around it, and an emitter that spawns short-lived sparks.

use std::cell::Cell;
use std::rc::Rc;

use engine_component::{Component, FrameContext, ObjectId};
use engine_connect::{MessageIn, MessageOut, PropertyIn};
use engine_math::{Transform, Vec3};
use engine_world::{DrawPass, PhysicsStep, World, WorldError};
use tracing::{debug, error, info, trace};

/// Stand-in physics world: only tracks simulated time.
#[derive(Debug, Default)]
pub struct Physics {
    pub elapsed: f32,
    pub steps: u64,
}

impl PhysicsStep for Physics {
    fn step_simulation(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
        self.steps += 1;
    }
}

/// Draw collector. Meshes register on initialize and leave on destroy.
#[derive(Debug, Default)]
pub struct DrawQueue {
    meshes: Vec<ObjectId>,
    pub submitted: u64,
}

impl DrawQueue {
    #[must_use]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl DrawPass for DrawQueue {
    fn call_draws(&mut self) {
        trace!(meshes = self.meshes.len(), "draw");
        self.submitted += self.meshes.len() as u64;
    }
}

pub struct MeshRenderer;

impl Component for MeshRenderer {
    fn initialize(&mut self, ctx: &mut FrameContext<'_>) {
        let id = ctx.object_id();
        if let Some(queue) = ctx.resource_mut::<DrawQueue>() {
            queue.meshes.push(id);
        }
    }

    fn destroy(&mut self, ctx: &mut FrameContext<'_>) {
        let id = ctx.object_id();
        if let Some(queue) = ctx.resource_mut::<DrawQueue>() {
            queue.meshes.retain(|&mesh| mesh != id);
        }
    }
}

/// Rotates its object at a constant rate (radians per second, XYZ).
pub struct Spinner {
    pub rate: Vec3,
}

impl Component for Spinner {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let step = self.rate * ctx.delta_time();
        ctx.update_transform(|t| t.rotate_euler(step));
    }
}

/// Moves its object on a horizontal circle around the origin.
pub struct Orbit {
    pub radius: f32,
    pub speed: f32,
    angle: f32,
}

impl Orbit {
    #[must_use]
    pub fn new(radius: f32, speed: f32) -> Self {
        Self {
            radius,
            speed,
            angle: 0.0,
        }
    }
}

impl Component for Orbit {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.angle += self.speed * ctx.delta_time();
        let position = Vec3::new(self.angle.cos(), 0.0, self.angle.sin()) * self.radius;
        ctx.update_transform(|t| t.position = position);
    }
}

/// Event fired by a [`Trigger`] when its target enters the volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub trigger: ObjectId,
    pub distance: f32,
}

/// Spherical trigger volume around its object. Fires once per entry.
pub struct Trigger {
    pub radius: f32,
    pub target: PropertyIn<Transform>,
    pub entered: MessageOut<Collision>,
    inside: bool,
}

impl Trigger {
    pub fn new(ports: &mut engine_connect::PortRegistrar<'_>, radius: f32) -> Self {
        Self {
            radius,
            target: PropertyIn::new(ports),
            entered: MessageOut::new(ports),
            inside: false,
        }
    }
}

impl Component for Trigger {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        let Ok(target) = self.target.with(|t| t.position) else {
            return;
        };
        let Ok(own) = ctx.transform() else {
            return;
        };
        let distance = target.distance(own.position);
        let inside = distance <= self.radius;
        if inside && !self.inside {
            self.entered.fire(&Collision {
                trigger: ctx.object_id(),
                distance,
            });
        }
        self.inside = inside;
    }
}

/// Counts collisions delivered to its input.
pub struct CollisionCounter {
    pub collisions: MessageIn<Collision>,
    pub count: Rc<Cell<u32>>,
}

impl CollisionCounter {
    pub fn new(ports: &mut engine_connect::PortRegistrar<'_>) -> Self {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let collisions = MessageIn::new(ports, move |hit: &Collision| {
            seen.set(seen.get() + 1);
            info!(trigger = %hit.trigger, distance = hit.distance, "collision");
        });
        Self { collisions, count }
    }
}

impl Component for CollisionCounter {}

/// Spawns a spark every `interval` frames; an interval of 0 never emits.
pub struct Emitter {
    pub interval: u64,
    pub spark_frames: u32,
}

impl Component for Emitter {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        if self.interval == 0 || ctx.frame() % self.interval != 0 {
            return;
        }
        let Ok(origin) = ctx.transform().map(|t| t.position) else {
            return;
        };
        let frames = self.spark_frames;
        let spark = ctx
            .create_object(format!("spark-{}", ctx.frame()))
            .with_position(origin)
            .with_component(|_| MeshRenderer)
            .with_component(|_| Lifetime { frames })
            .build();
        debug!(spark = %spark, "spark emitted");
    }
}

/// Destroys its own object after a number of updates.
pub struct Lifetime {
    pub frames: u32,
}

impl Component for Lifetime {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.frames = self.frames.saturating_sub(1);
        if self.frames == 0 {
            let id = ctx.object_id();
            if let Err(err) = ctx.destroy_object(id) {
                error!(%err, "spark could not expire");
            }
        }
    }
}

/// The beacon sits on the satellite's orbit, so the satellite passes through its
/// trigger once per revolution.
const BEACON_POSITION: Vec3 = Vec3::new(3.0, 0.0, 0.0);

/// Handles for reading scene state after a run.
#[derive(Debug)]
pub struct Scene {
    pub beacon: ObjectId,
    pub satellite: ObjectId,
    pub collisions: Rc<Cell<u32>>,
}

/// Populates `world` with the demo objects and wires their ports.
///
/// # Errors
///
/// Returns [`WorldError::Port`] if a link is rejected.
pub fn build(world: &mut World) -> Result<Scene, WorldError> {
    let mut beacon = world.create_object("beacon");
    beacon.add_component(|_| MeshRenderer);
    beacon.add_component(|_| Spinner {
        rate: Vec3::new(0.0, 1.5, 0.0),
    });
    let trigger = beacon.add_component(|ports| Trigger::new(ports, 1.0));
    let (trigger_target, trigger_out) = (trigger.target.id(), trigger.entered.id());
    beacon.add_component(|_| Emitter {
        interval: 30,
        spark_frames: 20,
    });
    let beacon = beacon.with_position(BEACON_POSITION).build();

    let mut satellite = world.create_object("satellite");
    satellite.add_component(|_| MeshRenderer);
    satellite.add_component(|_| Orbit::new(3.0, 2.0));
    let counter = satellite.add_component(CollisionCounter::new);
    let (counter_in, collisions) = (counter.collisions.id(), Rc::clone(&counter.count));
    let satellite = satellite.with_position(Vec3::new(3.0, 0.0, 0.0)).build();

    let satellite_root = world
        .object(satellite)
        .map(engine_component::Object::root_port)
        .ok_or(engine_component::ObjectError::UnknownObject(satellite))?;
    world.connect(satellite_root, trigger_target)?;
    world.connect(trigger_out, counter_in)?;

    info!(%beacon, %satellite, "scene built");
    Ok(Scene {
        beacon,
        satellite,
        collisions,
    })
}
