use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{DropPolicy, SlotList};

/// Builder for creating an instance of [`SlotList`].
///
/// You only need to use this builder if you want to customize the list configuration.
/// The default configuration used by [`SlotList::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use slot_list::{DropPolicy, SlotList};
///
/// let list = SlotList::<u32, 16>::builder()
///     .drop_policy(DropPolicy::MayDropItems)
///     .build();
///
/// assert_eq!(list.capacity(), 16);
/// ```
///
/// [1]: SlotList::new
#[must_use]
pub struct SlotListBuilder<T, const CAPACITY: usize> {
    drop_policy: DropPolicy,

    _item: PhantomData<T>,
}

impl<T, const CAPACITY: usize> fmt::Debug for SlotListBuilder<T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotListBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &CAPACITY)
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}

impl<T, const CAPACITY: usize> SlotListBuilder<T, CAPACITY> {
    pub(crate) fn new() -> Self {
        Self {
            drop_policy: DropPolicy::default(),
            _item: PhantomData,
        }
    }

    /// Sets the [drop policy][DropPolicy] for the list. This governs how
    /// to treat remaining items in the list when the list is dropped.
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the list with the specified configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_list::SlotList;
    ///
    /// let list = SlotList::<String, 4>::builder().build();
    ///
    /// assert!(list.is_empty());
    /// ```
    #[must_use]
    pub fn build(self) -> SlotList<T, CAPACITY> {
        SlotList::new_inner(self.drop_policy)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_policy_may_drop_items() {
        let builder = SlotList::<u32, 2>::builder();
        assert_eq!(builder.drop_policy, DropPolicy::MayDropItems);

        let list = builder.build();
        list.push_back(1).unwrap();
        drop(list);
    }

    #[test]
    fn debug_names_item_type() {
        let builder = SlotList::<String, 3>::builder().drop_policy(DropPolicy::MustNotDropItems);
        let debug = format!("{builder:?}");

        assert!(debug.contains("String"));
        assert!(debug.contains("capacity: 3"));
        assert!(debug.contains("MustNotDropItems"));
    }
}
