//! # ordkit
//!
//! Priority-queue and ordered-set data structures with strong asymptotic
//! guarantees:
//!
//! - [`FibonacciHeap`]: a mergeable min-priority queue with O(1) amortized
//!   `insert`, `merge`, and `decrease_key`, and O(log n) amortized
//!   `extract_min` and `delete`. Inserting returns an [`ItemHandle`] that
//!   stays valid across the heap's internal restructuring and addresses the
//!   item in later `decrease_key`/`delete` calls.
//! - [`VanEmdeBoasTree`]: an ordered set over the integer universe
//!   `0..u` (with `u` of the form 2^(2^k)) supporting `insert`, `delete`,
//!   `member`, `minimum`, `maximum`, `predecessor`, and `successor` in
//!   O(log log u) each.
//!
//! # Example
//! ```
//! use ordkit::{FibonacciHeap, VanEmdeBoasTree};
//!
//! let mut heap = FibonacciHeap::new();
//! heap.insert(3, "three");
//! heap.insert(1, "one");
//! let handle = heap.insert(2, "two");
//! heap.decrease_key(&handle, 0);
//! assert_eq!(heap.extract_min().map(|item| item.key), Some(0));
//!
//! let mut set = VanEmdeBoasTree::new(16);
//! set.insert(4);
//! set.insert(9);
//! assert_eq!(set.successor(4), Some(9));
//! ```

pub mod fibonacci;
pub mod van_emde_boas;

pub use fibonacci::{FibonacciHeap, Item, ItemHandle};
pub use van_emde_boas::VanEmdeBoasTree;
