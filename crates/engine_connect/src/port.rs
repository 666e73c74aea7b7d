//! Port identity and descriptor types.

use std::any::TypeId;
use std::fmt;

/// Directory-assigned identity of a single port.
///
/// Port ids start at 1 and are never reused within one
/// [`ConnectionsManager`](crate::ConnectionsManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(pub u64);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Port({})", self.0)
    }
}

/// Identity of a port owner.
///
/// Every component (and every object's transform root) registers as an owner
/// before creating ports, so all of its ports can be released together when it
/// is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.0)
    }
}

/// Which way data flows through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Reads a property or receives messages.
    In,
    /// Publishes a property or fires messages.
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => f.write_str("in"),
            Self::Out => f.write_str("out"),
        }
    }
}

/// What a port transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// A current value, readable at any time.
    Property,
    /// Discrete events, delivered when fired.
    Message,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property => f.write_str("property"),
            Self::Message => f.write_str("message"),
        }
    }
}

/// Type tag for the element a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementType {
    /// Rust type identity, used for the link-time check.
    pub id: TypeId,
    /// Human-readable type name, used in error messages and logs.
    pub name: &'static str,
}

impl ElementType {
    /// The tag for element type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }
}

/// Registration record of one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortInfo {
    /// The port's identity.
    pub id: PortId,
    /// The component that owns the port.
    pub owner: ComponentId,
    /// Data flow direction.
    pub direction: Direction,
    /// Property or message.
    pub kind: PortKind,
    /// Element type carried.
    pub element: ElementType,
}
