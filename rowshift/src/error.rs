//! Engine error types.
//!
//! All failures are local and non-fatal: a rejected operation leaves the
//! committed order and the drag session in their previous, valid state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// A move was requested with an index outside the current order.
    #[error("index {index} out of range for order of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A second drag activation arrived while a session is open.
    #[error("a drag session is already active for row '{active}'")]
    SessionActive { active: String },

    /// An operation referenced a key that is not part of the current order.
    #[error("unknown row key '{0}'")]
    UnknownKey(String),
}
