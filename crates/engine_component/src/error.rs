//! Object lifecycle error types.

use crate::id::ObjectId;

/// Errors raised by object lifecycle requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    /// The id does not name a live (or pending) object.
    #[error("{0} is not a live object")]
    UnknownObject(ObjectId),
}
