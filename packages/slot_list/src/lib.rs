#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A fixed-capacity, thread-safe FIFO linked list that never allocates.
//!
//! This crate provides [`SlotList`], a doubly linked list whose nodes live in an inline array of
//! `CAPACITY` slots. Free slots are kept on a free list, so taking and returning a slot are both
//! constant-time operations and the list itself never touches the heap after it is created. This
//! makes it suitable for `static` queues, for code that must not allocate on hot paths and for
//! environments where the number of queued items has a known upper bound.
//!
//! # Key Features
//!
//! - **No heap allocation**: All slots are stored inline, a list can live in a `static`
//! - **Constant-time operations**: Append at the back, remove at the front, both O(1)
//! - **Thread-safe**: Every operation takes `&self`, one lock guards the slot links
//! - **Construction outside the lock**: Items are built and dropped without holding the lock
//! - **Selective removal**: [`SlotList::remove_if()`] removes matching items anywhere in the list
//! - **Explicit capacity errors**: Insertion into a full list returns [`Full`] with the input
//! - **Flexible drop policies**: Configure behavior when a list is dropped with remaining items
//!
//! # Examples
//!
//! ## Producer and consumer
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//!
//! use slot_list::SlotList;
//!
//! let list = Arc::new(SlotList::<u64, 16>::new());
//!
//! let producer = thread::spawn({
//!     let list = Arc::clone(&list);
//!
//!     move || {
//!         for value in 0..10 {
//!             // The consumer may not have caught up yet, so retry until there is space.
//!             while list.push_back(value).is_err() {
//!                 thread::yield_now();
//!             }
//!         }
//!     }
//! });
//!
//! let mut received = Vec::new();
//!
//! while received.len() < 10 {
//!     match list.pop_front() {
//!         Some(value) => received.push(value),
//!         None => thread::yield_now(),
//!     }
//! }
//!
//! producer.join().unwrap();
//!
//! assert_eq!(received, (0..10).collect::<Vec<_>>());
//! ```
//!
//! ## Handling a full list
//!
//! ```rust
//! use slot_list::SlotList;
//!
//! let list = SlotList::<String, 1>::new();
//!
//! list.push_back("first".to_string()).unwrap();
//!
//! let error = list.push_back("second".to_string()).unwrap_err();
//! assert_eq!(error.capacity(), 1);
//!
//! // The rejected value is handed back to the caller.
//! assert_eq!(error.into_inner(), "second");
//! ```
//!
//! ## Inspecting items
//!
//! ```rust
//! use slot_list::SlotList;
//!
//! let list = SlotList::<u32, 8>::new();
//!
//! for value in 1..=4 {
//!     list.push_back(value).unwrap();
//! }
//!
//! // The guard holds the lock, other threads wait until it is dropped.
//! let locked = list.lock();
//!
//! assert_eq!(locked.front(), Some(&1));
//! assert_eq!(locked.iter().sum::<u32>(), 10);
//! ```

mod builder;
mod drop_policy;
mod error;
mod iter;
mod links;
mod list;
mod locked;
mod slot_index;

pub use builder::*;
pub use drop_policy::*;
pub use error::*;
pub use iter::*;
pub(crate) use links::*;
pub use list::*;
pub use locked::*;
pub use slot_index::MAX_CAPACITY;
pub(crate) use slot_index::SlotIndex;
