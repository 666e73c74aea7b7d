//! Collaborators the frame driver calls but does not own the logic of.
//!
//! Both live in the world's [`Resources`](engine_component::Resources), so
//! components can reach them from their hooks (for example to register a
//! renderable in `initialize` and remove it in `destroy`).

/// A physics simulation, stepped once per frame before objects are processed.
pub trait PhysicsStep: 'static {
    fn step_simulation(&mut self, delta_time: f32);
}

/// A draw collector, flushed once per frame after objects are processed.
pub trait DrawPass: 'static {
    fn call_draws(&mut self);
}
