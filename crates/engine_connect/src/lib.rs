//! # engine_connect
//!
//! Lateral data flow between components that do not know each other's
//! concrete types.
//!
//! This crate provides:
//!
//! - [`PortId`] / [`ComponentId`]: identities handed out by the directory.
//! - [`PropertyOut`] / [`PropertyIn`]: continuously readable typed values.
//! - [`MessageOut`] / [`MessageIn`]: synchronous typed event broadcast.
//! - [`ConnectionsManager`]: the per-world, type-checked link directory.
//! - [`PortError`]: everything that can go wrong linking or reading ports.
//!
//! Element types are compared once, when a link is made. Reads, writes and
//! fires after that go straight to shared storage without consulting the
//! directory.

mod endpoint;
pub mod error;
pub mod manager;
pub mod message;
pub mod port;
pub mod property;

pub use error::PortError;
pub use manager::{ConnectionsManager, PortRegistrar};
pub use message::{MessageIn, MessageOut};
pub use port::{ComponentId, Direction, ElementType, PortId, PortInfo, PortKind};
pub use property::{PropertyIn, PropertyOut};
