use std::any::type_name;
use std::fmt;

use thiserror::Error;

/// Returned when an item cannot be inserted into a [`SlotList`][crate::SlotList] because every
/// slot is occupied.
///
/// The rejected input is handed back to the caller untouched: the value for
/// [`push_back()`][1], or the unused constructor closure for [`push_back_with()`][2] and
/// [`emplace_back()`][3]. The caller decides whether to drop it, retry later or escalate.
///
/// # Examples
///
/// ```
/// use slot_list::SlotList;
///
/// let list = SlotList::<String, 1>::new();
/// list.push_back("first".to_string()).unwrap();
///
/// let error = list.push_back("second".to_string()).unwrap_err();
/// assert_eq!(error.capacity(), 1);
/// assert_eq!(error.into_inner(), "second");
/// ```
///
/// [1]: crate::SlotList::push_back
/// [2]: crate::SlotList::push_back_with
/// [3]: crate::SlotList::emplace_back
#[derive(Error)]
#[error("slot list is full: all {capacity} slots are occupied")]
pub struct Full<V> {
    rejected: V,
    capacity: usize,
}

impl<V> Full<V> {
    pub(crate) fn new(rejected: V, capacity: usize) -> Self {
        Self { rejected, capacity }
    }

    /// The capacity of the list that rejected the insertion.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the rejected input.
    #[must_use]
    pub fn into_inner(self) -> V {
        self.rejected
    }
}

// Manual implementation so the rejected input does not need to be `Debug` (closures are not).
impl<V> fmt::Debug for Full<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Full")
            .field("rejected", &format_args!("{}", type_name::<V>()))
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::error::Error as _;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Full<u32>: Send, Sync, fmt::Debug, std::error::Error);
    assert_impl_all!(Full<fn() -> u32>: Send, Sync, fmt::Debug, std::error::Error);

    #[test]
    fn returns_rejected_value() {
        let error = Full::new("hello".to_string(), 4);

        assert_eq!(error.capacity(), 4);
        assert_eq!(error.into_inner(), "hello");
    }

    #[test]
    fn display_mentions_capacity() {
        let error = Full::new(1_u8, 16);

        assert_eq!(
            error.to_string(),
            "slot list is full: all 16 slots are occupied"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn debug_does_not_require_debug_value() {
        struct Opaque;

        let error = Full::new(Opaque, 2);
        let debug = format!("{error:?}");

        assert!(debug.contains("Opaque"));
        assert!(debug.contains("capacity: 2"));
    }
}
