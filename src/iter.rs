use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use crate::array::DynamicArray;

/// Owning iterator returned by `DynamicArray::into_iter`.
///
/// The drained array keeps ownership of the buffer with its length pinned to
/// zero; elements in `[start, end)` are still initialized and owned here.
pub struct IntoIter<T> {
    array: DynamicArray<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [start, end) are initialized and not yet moved out.
        unsafe {
            slice::from_raw_parts(
                self.array.as_ptr().add(self.start),
                self.end - self.start,
            )
        }
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        let end = self.len();
        // SAFETY: the elements stay in place and are owned by the iterator
        // from here on; the array only releases the buffer.
        unsafe { self.set_len(0) };
        IntoIter {
            array: self,
            start: 0,
            end,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: slot `start` is initialized and is read exactly once.
        let element = unsafe { ptr::read(self.array.as_ptr().add(self.start)) };
        self.start += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: slot `end` is initialized and now outside the live range.
        Some(unsafe { ptr::read(self.array.as_ptr().add(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.end - self.start;
        // Mark everything consumed before dropping, so a panicking destructor
        // cannot cause a second drop.
        let start = self.start;
        self.start = self.end;
        // SAFETY: [start, start + remaining) were still owned by the iterator.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.array.as_mut_ptr().add(start),
                remaining,
            ));
        }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
