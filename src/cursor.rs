//! Removal-aware traversal over a [`DynamicArray`].
//!
//! A cursor mutably borrows its array for as long as it lives, so the only
//! structural change the array can see during a traversal is the cursor's
//! own [`remove`](Cursor::remove). Anything else is rejected at compile time.

use crate::array::DynamicArray;
use crate::error::{ArrayError, Result};

/// Front-to-back cursor.
pub struct Cursor<'a, T> {
    array: &'a mut DynamicArray<T>,
    /// Index of the element the next call to `next` yields.
    position: usize,
    /// Index of the element last yielded, cleared by `remove`.
    last: Option<usize>,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(array: &'a mut DynamicArray<T>) -> Self {
        Self {
            array,
            position: 0,
            last: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.position < self.array.len()
    }

    /// Yields the next element, or [`ArrayError::EndOfSequence`] when the
    /// traversal is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<&T> {
        let index = self.position;
        let element = self
            .array
            .get(index)
            .map_err(|_| ArrayError::EndOfSequence)?;
        self.last = Some(index);
        self.position = index + 1;
        Ok(element)
    }

    /// Removes the element last yielded by [`next`](Self::next).
    ///
    /// The following `next` yields the element that came right after the
    /// removed one. Calling this twice without an intervening `next`, or
    /// before any `next`, fails with [`ArrayError::InvalidState`].
    pub fn remove(&mut self) -> Result<T> {
        let index = self.last.ok_or(ArrayError::InvalidState)?;
        let removed = self.array.remove(index)?;
        self.position = index;
        self.last = None;
        Ok(removed)
    }
}

/// Back-to-front cursor.
pub struct ReverseCursor<'a, T> {
    array: &'a mut DynamicArray<T>,
    /// Elements not yet yielded; the next one sits at `remaining - 1`.
    remaining: usize,
    last: Option<usize>,
}

impl<'a, T> ReverseCursor<'a, T> {
    pub(crate) fn new(array: &'a mut DynamicArray<T>) -> Self {
        let remaining = array.len();
        Self {
            array,
            remaining,
            last: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.remaining > 0
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<&T> {
        let index = self
            .remaining
            .checked_sub(1)
            .ok_or(ArrayError::EndOfSequence)?;
        let element = self
            .array
            .get(index)
            .map_err(|_| ArrayError::EndOfSequence)?;
        self.last = Some(index);
        self.remaining = index;
        Ok(element)
    }

    /// Removes the element last yielded by [`next`](Self::next).
    ///
    /// Only elements already visited shift, so the traversal continues with
    /// the element just before the removed one.
    pub fn remove(&mut self) -> Result<T> {
        let index = self.last.ok_or(ArrayError::InvalidState)?;
        let removed = self.array.remove(index)?;
        self.last = None;
        Ok(removed)
    }
}
