//! # engine_component
//!
//! Objects, components and their lifecycle.
//!
//! This crate provides:
//!
//! - [`ObjectId`]: stable object identity, never reused.
//! - [`Component`]: per-object behavior with `initialize` / `update` /
//!   `destroy` hooks.
//! - [`Object`] / [`ObjectBuilder`]: a named component container with a root
//!   transform, and the builder that populates it.
//! - [`FrameContext`]: what a hook can reach (spawning, destruction, wiring,
//!   resources).
//! - [`Resources`]: type-keyed world services.
//! - [`ObjectManager`]: creation, the per-frame passes and teardown.

pub mod component;
pub mod context;
pub mod error;
pub mod id;
pub mod manager;
pub mod object;
pub mod resources;

pub use component::{AsAny, Component};
pub use context::{FrameContext, FrameInfo};
pub use error::ObjectError;
pub use id::ObjectId;
pub use manager::{FrameReport, ObjectManager};
pub use object::{Object, ObjectBuilder, ObjectState};
pub use resources::Resources;
