//! The world: one self-contained simulation context and its frame driver.
//!
//! A world owns one [`ObjectManager`], one [`ConnectionsManager`] and the
//! resources its components share. Each frame runs, in order:
//!
//! 1. the physics step (if a [`PhysicsStep`] is installed);
//! 2. [`ObjectManager::process_frame`];
//! 3. the draw pass (if a [`DrawPass`] is installed).
//!
//! [`World::run`] wraps that in a blocking loop with an optional frame-rate
//! limit. The stop flag is only checked between frames.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use engine_component::{FrameReport, Object, ObjectBuilder, ObjectId, ObjectManager, Resources};
use engine_connect::{ConnectionsManager, PortId};
use tracing::{debug, info, warn};

use crate::boundary::{DrawPass, PhysicsStep};
use crate::config::WorldConfig;
use crate::error::WorldError;

type PhysicsFn = fn(&mut Resources, f32);
type DrawFn = fn(&mut Resources);

fn step_physics<P: PhysicsStep>(resources: &mut Resources, delta_time: f32) {
    if let Some(physics) = resources.get_mut::<P>() {
        physics.step_simulation(delta_time);
    }
}

fn call_draws<D: DrawPass>(resources: &mut Resources) {
    if let Some(draw) = resources.get_mut::<D>() {
        draw.call_draws();
    }
}

/// Clonable handle that stops a running world at the next frame boundary.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// One simulation context.
pub struct World {
    config: WorldConfig,
    objects: ObjectManager,
    connections: ConnectionsManager,
    resources: Resources,
    physics: Option<PhysicsFn>,
    draw: Option<DrawFn>,
    stop: StopHandle,
    initialized: bool,
    last_delta: f32,
}

impl World {
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            objects: ObjectManager::new(),
            connections: ConnectionsManager::new(),
            resources: Resources::new(),
            physics: None,
            draw: None,
            stop: StopHandle(Arc::new(AtomicBool::new(false))),
            initialized: false,
            last_delta: 0.0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Installs the physics simulation. It is stored as a resource.
    #[must_use]
    pub fn with_physics<P: PhysicsStep>(mut self, physics: P) -> Self {
        self.set_physics(physics);
        self
    }

    pub fn set_physics<P: PhysicsStep>(&mut self, physics: P) {
        self.resources.insert(physics);
        self.physics = Some(step_physics::<P>);
    }

    /// Installs the draw collector. It is stored as a resource.
    #[must_use]
    pub fn with_draw_pass<D: DrawPass>(mut self, draw: D) -> Self {
        self.set_draw_pass(draw);
        self
    }

    pub fn set_draw_pass<D: DrawPass>(&mut self, draw: D) {
        self.resources.insert(draw);
        self.draw = Some(call_draws::<D>);
    }

    pub fn insert_resource<T: 'static>(&mut self, value: T) -> Option<T> {
        self.resources.insert(value)
    }

    #[must_use]
    pub fn resource<T: 'static>(&self) -> Option<&T> {
        self.resources.get::<T>()
    }

    pub fn resource_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources.get_mut::<T>()
    }

    /// Creates an object; see [`ObjectManager::create_object`].
    pub fn create_object(&mut self, name: impl Into<String>) -> ObjectBuilder<'_> {
        self.objects.create_object(&mut self.connections, name)
    }

    /// Marks an object for destruction at the end of the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Object`] if `id` is not live.
    pub fn destroy_object(&mut self, id: ObjectId) -> Result<(), WorldError> {
        Ok(self.objects.destroy_object(id)?)
    }

    /// Links an output port to an input port.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Port`] if the ports are unknown or incompatible.
    pub fn connect(&mut self, output: PortId, input: PortId) -> Result<(), WorldError> {
        Ok(self.connections.connect(output, input)?)
    }

    /// Removes every link touching `port`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Port`] if `port` is not registered.
    pub fn disconnect(&mut self, port: PortId) -> Result<usize, WorldError> {
        Ok(self.connections.disconnect(port)?)
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    #[must_use]
    pub fn objects(&self) -> &ObjectManager {
        &self.objects
    }

    #[must_use]
    pub fn connections(&self) -> &ConnectionsManager {
        &self.connections
    }

    /// Startup pass. Runs at most once; [`run`](Self::run) calls it if needed.
    pub fn initialize(&mut self) -> usize {
        if self.initialized {
            warn!("world already initialized");
            return 0;
        }
        self.initialized = true;
        self.objects
            .initialize_objects(&mut self.connections, &mut self.resources)
    }

    /// Runs one frame: physics step, object processing, draw pass.
    pub fn frame(&mut self, delta_time: f32) -> FrameReport {
        if let Some(step) = self.physics {
            step(&mut self.resources, delta_time);
        }

        let report = self
            .objects
            .process_frame(&mut self.connections, &mut self.resources, delta_time);

        if let Some(draw) = self.draw {
            draw(&mut self.resources);
        }

        self.last_delta = delta_time;
        if self.objects.take_exit_request() {
            info!(frame = report.frame, "exit requested by a component");
            self.stop.stop();
        }

        debug!(
            frame = report.frame,
            delta_time,
            initialized = report.initialized,
            updated = report.updated,
            spawned = report.spawned,
            destroyed = report.destroyed,
            live = report.live,
            "frame processed"
        );
        report
    }

    /// Runs frames until stopped, then shuts the world down.
    ///
    /// Stops when a component requests exit, a [`StopHandle`] is triggered
    /// or `max_frames` is reached. Returns the number of frames run.
    pub fn run(&mut self) -> u64 {
        if !self.initialized {
            self.initialize();
        }
        self.stop.reset();

        let budget = self.config.frame_budget();
        info!(
            frame_rate_limit = self.config.frame_rate_limit,
            max_frames = self.config.max_frames,
            objects = self.objects.len(),
            "world running"
        );

        let mut frames = 0u64;
        let mut last = Instant::now();
        while !self.stop.is_stopped() {
            let start = Instant::now();
            let measured = start.duration_since(last).as_secs_f32();
            last = start;

            self.frame(self.config.fixed_delta.unwrap_or(measured));
            frames += 1;

            if self.config.max_frames > 0 && frames >= self.config.max_frames {
                break;
            }

            if let Some(budget) = budget {
                let elapsed = start.elapsed();
                if elapsed < budget {
                    std::thread::sleep(budget - elapsed);
                } else {
                    warn!(
                        frame = self.objects.frame_count(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        budget_ms = budget.as_millis() as u64,
                        "frame exceeded time budget"
                    );
                }
            }
        }

        info!(frames, "world stopped");
        self.shutdown();
        frames
    }

    /// Handle for stopping [`run`](Self::run) from elsewhere.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Stops [`run`](Self::run) after the current frame.
    pub fn exit(&mut self) {
        self.stop.stop();
    }

    /// Frames per second implied by the last frame's delta.
    #[must_use]
    pub fn frame_rate(&self) -> f32 {
        if self.last_delta > 0.0 {
            1.0 / self.last_delta
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.objects.frame_count()
    }

    /// Teardown: destroys every object and empties the connections directory.
    pub fn shutdown(&mut self) -> usize {
        let destroyed = self
            .objects
            .destroy_objects(&mut self.connections, &mut self.resources);
        self.connections.clear();
        self.initialized = false;
        info!(destroyed, "world shut down");
        destroyed
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("objects", &self.objects)
            .field("connections", &self.connections)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
