//! # engine_world
//!
//! One self-contained simulation context and the loop that drives it.
//!
//! This crate provides:
//!
//! - [`World`]: owns the object manager, the connections directory and the
//!   shared resources; runs frames.
//! - [`WorldConfig`]: frame-rate limit, frame cap and fixed delta, loadable
//!   from JSON.
//! - [`PhysicsStep`] / [`DrawPass`]: the collaborators called before and
//!   after object processing.
//! - [`WorldError`]: everything a world operation can fail with.

pub mod boundary;
pub mod config;
pub mod error;
pub mod world;

pub use boundary::{DrawPass, PhysicsStep};
pub use config::WorldConfig;
pub use error::WorldError;
pub use world::{StopHandle, World};
