/// Determines what happens to the items still in a [`SlotList`][crate::SlotList] when the list
/// itself is dropped.
///
/// By default, the list drops its remaining items.
///
/// # Examples
///
/// ```
/// use slot_list::{DropPolicy, SlotList};
///
/// let list = SlotList::<u32, 8>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// list.push_back(42).unwrap();
///
/// // The list must be drained before it is dropped.
/// assert_eq!(list.pop_front(), Some(42));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The list will drop its remaining items when it is dropped. This is the default.
    #[default]
    MayDropItems,

    /// The list will panic if it still contains items when it is dropped. The items are
    /// dropped first.
    ///
    /// This may be valuable if the items represent work or resources that must be explicitly
    /// drained (e.g. via [`pop_front()`][1] or [`consume_front()`][2]) before shutdown, and
    /// silently discarding them would be a bug.
    ///
    /// [1]: crate::SlotList::pop_front
    /// [2]: crate::SlotList::consume_front
    MustNotDropItems,
}
