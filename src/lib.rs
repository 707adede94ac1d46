//! A growable, contiguous array with index-based editing and cursors that
//! can remove elements mid-traversal.
//!
//! ```
//! use dynarray::DynamicArray;
//!
//! let mut numbers = DynamicArray::new();
//! numbers.add(1);
//! numbers.add(2);
//! numbers.add(3);
//! numbers.insert(1, 10).unwrap();
//! assert_eq!(numbers.to_string(), "[1, 10, 2, 3]");
//!
//! let mut cursor = numbers.cursor();
//! while cursor.has_next() {
//!     if *cursor.next().unwrap() % 2 == 0 {
//!         cursor.remove().unwrap();
//!     }
//! }
//! assert_eq!(numbers.to_string(), "[1, 3]");
//! ```

pub mod array;
pub mod cursor;
pub mod error;
pub mod iter;

pub use array::{DynamicArray, DEFAULT_CAPACITY};
pub use cursor::{Cursor, ReverseCursor};
pub use error::{ArrayError, Result};
pub use iter::IntoIter;
