use thiserror::Error;

/// Result type alias using [`ArrayError`]
pub type Result<T> = std::result::Result<T, ArrayError>;

/// Failures reported by [`DynamicArray`](crate::DynamicArray) and its cursors.
///
/// Every failing call validates its arguments before touching the buffer, so
/// an `Err` always leaves the array exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArrayError {
    /// A capacity of zero was requested at construction.
    #[error("invalid initial capacity: {capacity}")]
    InvalidArgument { capacity: usize },

    /// An index fell outside the valid range for the operation
    /// (`[0, len)` for access and removal, `[0, len]` for insertion).
    #[error("index out of bounds: {index} (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A cursor was advanced past its last element.
    #[error("no more elements")]
    EndOfSequence,

    /// A cursor removal without an unconsumed `next`.
    #[error("remove called without a preceding next")]
    InvalidState,

    #[error("allocation failed")]
    AllocFailed,
}

impl ArrayError {
    pub(crate) fn out_of_bounds(index: usize, len: usize) -> Self {
        ArrayError::IndexOutOfBounds { index, len }
    }
}
