use std::any::type_name;
use std::fmt;
use std::sync::MutexGuard;

use crate::{Iter, IterMut, Links, Slot};

/// Exclusive access to the items of a [`SlotList`][crate::SlotList] while its lock is held.
///
/// Returned by [`SlotList::lock()`][crate::SlotList::lock]. Operations on the list from other
/// threads block until the guard is dropped. Calling any method of the list from the thread
/// that holds the guard deadlocks.
///
/// The guard sees the items that are in the list. Items that another thread has started to
/// remove but not yet finished removing are not visible and not counted by [`len()`][1].
///
/// [1]: Self::len
pub struct Locked<'a, T, const CAPACITY: usize> {
    links: MutexGuard<'a, Links<CAPACITY>>,
    slots: &'a [Slot<T>; CAPACITY],
}

impl<'a, T, const CAPACITY: usize> Locked<'a, T, CAPACITY> {
    /// # Safety
    ///
    /// `links` must be the guarded bookkeeping of `slots`, such that every slot in its used list
    /// holds a live value.
    pub(crate) unsafe fn new(
        links: MutexGuard<'a, Links<CAPACITY>>,
        slots: &'a [Slot<T>; CAPACITY],
    ) -> Self {
        Self { links, slots }
    }

    /// The number of items visible through the guard.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.used_len()
    }

    /// Whether no items are visible through the guard.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The item at the front of the list, which is the next one to be popped.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.links.head().map(|position| self.value(position))
    }

    /// The item at the back of the list, which is the most recently appended one.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.links.tail().map(|position| self.value(position))
    }

    /// Exclusive access to the item at the front of the list.
    #[must_use]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.links.head().map(|position| self.value_mut(position))
    }

    /// Exclusive access to the item at the back of the list.
    #[must_use]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.links.tail().map(|position| self.value_mut(position))
    }

    /// Returns an iterator over shared references to the items, front to back.
    pub fn iter(&self) -> Iter<'_, T, CAPACITY> {
        // SAFETY: We hold the lock, so no value in the used list can be removed, and all
        // modifications go through `&mut self`, which the shared borrow here excludes.
        unsafe { Iter::new(&self.links, self.slots) }
    }

    /// Returns an iterator over exclusive references to the items, front to back.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, CAPACITY> {
        // SAFETY: We hold the lock, so no value in the used list can be removed or accessed by
        // anyone else, and the exclusive borrow of the guard excludes all other access via it.
        unsafe { IterMut::new(&self.links, self.slots) }
    }

    fn value(&self, position: usize) -> &T {
        let slot = self
            .slots
            .get(position)
            .expect("used list only links to slots in bounds");

        // SAFETY: The slot is in the used list so it holds a live value, which cannot be removed
        // while we hold the lock or modified while we are borrowed immutably.
        unsafe { (*slot.get()).assume_init_ref() }
    }

    fn value_mut(&mut self, position: usize) -> &mut T {
        let slot = self
            .slots
            .get(position)
            .expect("used list only links to slots in bounds");

        // SAFETY: The slot is in the used list so it holds a live value. We hold the lock and
        // are borrowed exclusively, so nothing else can access the value.
        unsafe { (*slot.get()).assume_init_mut() }
    }
}

impl<T, const CAPACITY: usize> fmt::Debug for Locked<'_, T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locked")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("len", &self.len())
            .field("capacity", &CAPACITY)
            .finish_non_exhaustive()
    }
}

impl<'a, T, const CAPACITY: usize> IntoIterator for &'a Locked<'_, T, CAPACITY> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, CAPACITY>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const CAPACITY: usize> IntoIterator for &'a mut Locked<'_, T, CAPACITY> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, CAPACITY>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
