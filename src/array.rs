use std::alloc::{self, handle_alloc_error, Layout};
use std::cmp;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::slice;

use log::{debug, trace};

use crate::cursor::{Cursor, ReverseCursor};
use crate::error::{ArrayError, Result};

/// Capacity allocated by [`DynamicArray::new`].
pub const DEFAULT_CAPACITY: usize = 10;

/// A growable, contiguous, owned array.
///
/// Slots `[0, len)` of the buffer hold initialized elements in sequence
/// order; slots `[len, cap)` are uninitialized spare capacity. Capacity only
/// grows on its own (doubling, or straight to the requested size when that is
/// larger); [`clear`](Self::clear) keeps the allocation and only
/// [`shrink_to_fit`](Self::shrink_to_fit) hands memory back.
///
/// The array has no internal locking. It is `Send`/`Sync` whenever `T` is,
/// so callers that need shared mutation wrap it in a `Mutex` themselves.
pub struct DynamicArray<T> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the array uniquely owns its buffer, so moving it to another thread
// moves the elements with it.
unsafe impl<T: Send> Send for DynamicArray<T> {}
// SAFETY: `&DynamicArray<T>` only hands out `&T`.
unsafe impl<T: Sync> Sync for DynamicArray<T> {}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

impl<T> DynamicArray<T> {
    /// Creates an empty array with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::allocated(DEFAULT_CAPACITY)
    }

    /// Creates an empty array with room for `capacity` elements.
    ///
    /// A capacity of zero is rejected with [`ArrayError::InvalidArgument`].
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ArrayError::InvalidArgument { capacity });
        }
        Ok(Self::allocated(capacity))
    }

    fn allocated(capacity: usize) -> Self {
        let mut array = Self {
            ptr: NonNull::dangling(),
            cap: 0,
            len: 0,
            _marker: PhantomData,
        };
        array.ensure_capacity(capacity);
        array
    }

    /// Number of elements currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the buffer can hold before it must grow.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [0, len) are initialized and the pointer is non-null
        // and aligned (dangling only when nothing is allocated).
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, and `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Sets the logical length without touching any slot.
    ///
    /// # Safety
    ///
    /// `len` must not exceed the capacity, slots `[0, len)` must be
    /// initialized, and any slot dropped out of range must already have been
    /// moved out or dropped by the caller.
    pub(crate) unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.cap);
        self.len = len;
    }

    /// Appends `element`, growing the buffer first if it is full.
    pub fn add(&mut self, element: T) {
        self.ensure_capacity(self.required(1));
        // SAFETY: capacity exceeds len, so slot `len` is allocated and unused.
        unsafe {
            ptr::write(self.ptr.as_ptr().add(self.len), element);
        }
        self.len += 1;
    }

    /// Appends every element of `elements` in order.
    ///
    /// Capacity is reserved once for the iterator's lower size bound, so a
    /// sized source (slice, `Vec`, array) triggers at most one reallocation.
    pub fn add_all<I>(&mut self, elements: I)
    where
        I: IntoIterator<Item = T>,
    {
        let elements = elements.into_iter();
        let (lower, _) = elements.size_hint();
        self.ensure_capacity(self.required(lower));
        for element in elements {
            self.add(element);
        }
    }

    /// Inserts `element` at `index`, shifting the tail one slot right.
    ///
    /// `index == len()` appends. Anything larger fails with
    /// [`ArrayError::IndexOutOfBounds`] and leaves the array untouched.
    pub fn insert(&mut self, index: usize, element: T) -> Result<()> {
        if index > self.len {
            return Err(ArrayError::out_of_bounds(index, self.len));
        }
        self.ensure_capacity(self.required(1));
        // SAFETY: index <= len < cap; the shifted range [index, len) moves
        // into [index + 1, len + 1), which is inside the allocation.
        unsafe {
            let p = self.ptr.as_ptr().add(index);
            ptr::copy(p, p.add(1), self.len - index);
            ptr::write(p, element);
        }
        self.len += 1;
        Ok(())
    }

    /// Replaces the element at `index` and returns the old one.
    pub fn set(&mut self, index: usize, element: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(mem::replace(slot, element))
    }

    /// Removes and returns the element at `index`, shifting the tail left.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(ArrayError::out_of_bounds(index, self.len));
        }
        // SAFETY: index < len, so the slot is initialized. After the read the
        // slot is logically moved out and is overwritten by the shift.
        unsafe {
            let p = self.ptr.as_ptr().add(index);
            let removed = ptr::read(p);
            ptr::copy(p.add(1), p, self.len - index - 1);
            self.len -= 1;
            Ok(removed)
        }
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was the last initialized one and is now outside
        // the logical range, so it is read exactly once.
        Some(unsafe { ptr::read(self.ptr.as_ptr().add(self.len)) })
    }

    /// Drops every element. The allocation is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = self.len - len;
        // Shorten first: a panicking destructor must not lead to a double drop.
        self.len = len;
        // SAFETY: [len, len + tail) were initialized and are no longer
        // reachable through the array.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr().add(len),
                tail,
            ));
        }
    }

    /// Keeps only the elements for which `keep` returns true, in order.
    fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut kept = 0;
        for index in 0..self.len {
            if keep(&self.as_slice()[index]) {
                self.as_mut_slice().swap(kept, index);
                kept += 1;
            }
        }
        self.truncate(kept);
    }

    pub fn get(&self, index: usize) -> Result<&T> {
        self.as_slice()
            .get(index)
            .ok_or(ArrayError::out_of_bounds(index, self.len))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(ArrayError::out_of_bounds(index, len))
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Forward cursor positioned before the first element.
    pub fn cursor(&mut self) -> Cursor<'_, T> {
        Cursor::new(self)
    }

    /// Backward cursor positioned at the last element.
    pub fn reverse_cursor(&mut self) -> ReverseCursor<'_, T> {
        ReverseCursor::new(self)
    }

    /// Reserves room for `additional` more elements without panicking.
    ///
    /// On failure the array keeps its previous buffer and contents.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(ArrayError::AllocFailed)?;
        if required > self.cap {
            let new_cap = cmp::max(required, self.cap.saturating_mul(2));
            let layout = Layout::array::<T>(new_cap).map_err(|_| ArrayError::AllocFailed)?;
            self.do_realloc(new_cap, layout)?;
        }
        Ok(())
    }

    /// Shrinks the buffer to exactly `len()` slots.
    pub fn shrink_to_fit(&mut self) {
        if self.len == self.cap {
            return;
        }
        debug!("shrinking buffer: capacity {} -> {}", self.cap, self.len);
        // A layout for `len` elements fits since one for `cap >= len` did.
        let layout = match Layout::array::<T>(self.len) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(),
        };
        if self.do_realloc(self.len, layout).is_err() {
            handle_alloc_error(layout);
        }
    }

    fn required(&self, additional: usize) -> usize {
        match self.len.checked_add(additional) {
            Some(required) => required,
            None => capacity_overflow(),
        }
    }

    /// Grows the buffer to `max(min_capacity, 2 * capacity)` when
    /// `min_capacity` exceeds the current capacity.
    fn ensure_capacity(&mut self, min_capacity: usize) {
        if min_capacity <= self.cap {
            return;
        }
        let new_cap = cmp::max(min_capacity, self.cap.saturating_mul(2));
        let layout = match Layout::array::<T>(new_cap) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(),
        };
        if self.do_realloc(new_cap, layout).is_err() {
            handle_alloc_error(layout);
        }
    }

    /// Layout of the live allocation, `None` when nothing is allocated.
    fn current_layout(&self) -> Option<Layout> {
        if self.cap == 0 || mem::size_of::<T>() == 0 {
            None
        } else {
            Layout::array::<T>(self.cap).ok()
        }
    }

    /// Moves the buffer to a block of `new_cap` slots. `new_cap >= len`.
    fn do_realloc(&mut self, new_cap: usize, new_layout: Layout) -> Result<()> {
        debug_assert!(new_cap >= self.len);
        let new_ptr = match (self.current_layout(), new_layout.size()) {
            (None, 0) => NonNull::dangling(),
            (Some(old_layout), 0) => {
                // SAFETY: the block was allocated with `old_layout` and holds
                // no initialized elements (len == 0 when new_cap == 0).
                unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), old_layout) };
                NonNull::dangling()
            }
            (None, _) => {
                // SAFETY: the layout has non-zero size.
                let raw = unsafe { alloc::alloc(new_layout) };
                NonNull::new(raw.cast::<T>()).ok_or(ArrayError::AllocFailed)?
            }
            (Some(old_layout), size) => {
                // SAFETY: the block was allocated with `old_layout`; realloc
                // copies the first min(old, new) bytes, which covers [0, len).
                let raw = unsafe { alloc::realloc(self.ptr.as_ptr().cast(), old_layout, size) };
                NonNull::new(raw.cast::<T>()).ok_or(ArrayError::AllocFailed)?
            }
        };
        trace!("reallocated buffer: capacity {} -> {}", self.cap, new_cap);
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }
}

impl<T: PartialEq> DynamicArray<T> {
    pub fn contains(&self, element: &T) -> bool {
        self.index_of(element).is_some()
    }

    /// Index of the first element equal to `element`.
    pub fn index_of(&self, element: &T) -> Option<usize> {
        self.iter().position(|e| e == element)
    }

    /// Index of the last element equal to `element`.
    pub fn last_index_of(&self, element: &T) -> Option<usize> {
        self.iter().rposition(|e| e == element)
    }

    /// Removes the first occurrence of `element`. Returns whether one was found.
    pub fn remove_element(&mut self, element: &T) -> bool {
        match self.index_of(element) {
            Some(index) => self.remove(index).is_ok(),
            None => false,
        }
    }

    /// Removes every occurrence of every value in `elements`.
    ///
    /// Each value purges all of its matches, not just the first, and values
    /// named more than once are simply purged again. Returns whether anything
    /// was removed.
    pub fn remove_all(&mut self, elements: &[T]) -> bool {
        let before = self.len;
        for element in elements {
            self.retain(|e| e != element);
        }
        self.len != before
    }
}

impl<T: Clone> DynamicArray<T> {
    /// Copies the present elements into a new, independent `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        self.clear();
        if let Some(layout) = self.current_layout() {
            // SAFETY: the block was allocated with this layout and every
            // element has been dropped above.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), layout) };
        }
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    fn clone(&self) -> Self {
        let mut array = Self::allocated(self.cap);
        array.add_all(self.iter().cloned());
        array
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Renders `[e0, e1, ...]`, or `[]` when empty.
impl<T: fmt::Display> fmt::Display for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, element) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", element)?;
        }
        f.write_str("]")
    }
}

impl<T: PartialEq<U>, U> PartialEq<DynamicArray<U>> for DynamicArray<T> {
    fn eq(&self, other: &DynamicArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: PartialEq<U>, U> PartialEq<Vec<U>> for DynamicArray<T> {
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<T: Hash> Hash for DynamicArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.add_all(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut array = Self::allocated(cmp::max(DEFAULT_CAPACITY, lower));
        array.add_all(iter);
        array
    }
}

impl<T> From<Vec<T>> for DynamicArray<T> {
    fn from(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(elements: [T; N]) -> Self {
        elements.into_iter().collect()
    }
}
