//! Port and connection error types.

use crate::port::{Direction, PortId, PortKind};

/// Errors raised while linking, unlinking or reading ports.
///
/// All of these indicate a defect in the caller's wiring rather than a
/// transient condition; none of them are worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The port id is not (or no longer) registered.
    #[error("{0} is not registered")]
    UnknownPort(PortId),

    /// A link must run from an `Out` port to an `In` port.
    #[error("cannot link {output} ({output_direction}) to {input} ({input_direction}): links run from out to in")]
    DirectionMismatch {
        /// The port offered as the source.
        output: PortId,
        /// Its actual direction.
        output_direction: Direction,
        /// The port offered as the destination.
        input: PortId,
        /// Its actual direction.
        input_direction: Direction,
    },

    /// Property ports only link to property ports, message to message.
    #[error("cannot link {output_kind} {output} to {input_kind} {input}")]
    KindMismatch {
        /// The source port.
        output: PortId,
        /// What the source transports.
        output_kind: PortKind,
        /// The destination port.
        input: PortId,
        /// What the destination transports.
        input_kind: PortKind,
    },

    /// The two ports carry different element types.
    #[error("type mismatch: {output} carries `{output_type}` but {input} expects `{input_type}`")]
    TypeMismatch {
        /// The source port.
        output: PortId,
        /// Element type of the source.
        output_type: &'static str,
        /// The destination port.
        input: PortId,
        /// Element type of the destination.
        input_type: &'static str,
    },

    /// The input already has a source (property) or already has this exact
    /// link (message).
    #[error("{0} is already connected")]
    AlreadyConnected(PortId),

    /// A property input was read while it has no source.
    #[error("{0} is not connected")]
    Unconnected(PortId),

    /// The property value is already borrowed further up the stack (a read
    /// inside a write of the same value, or the other way round).
    #[error("{0} is busy")]
    Busy(PortId),
}
