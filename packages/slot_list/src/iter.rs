use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::{Links, Slot, SlotList};

/// Iterator over shared references to the items of a [`SlotList`], front to back.
///
/// Returned by [`Locked::iter()`][crate::Locked::iter].
pub struct Iter<'a, T, const CAPACITY: usize> {
    links: &'a Links<CAPACITY>,
    slots: &'a [Slot<T>; CAPACITY],
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T, const CAPACITY: usize> Iter<'a, T, CAPACITY> {
    /// # Safety
    ///
    /// Every slot in the used list of `links` must hold a live value, and no value in the used
    /// list may be modified or dropped for the lifetime `'a`.
    pub(crate) unsafe fn new(links: &'a Links<CAPACITY>, slots: &'a [Slot<T>; CAPACITY]) -> Self {
        Self {
            links,
            slots,
            cursor: links.head(),
            remaining: links.used_len(),
        }
    }
}

impl<'a, T, const CAPACITY: usize> Iterator for Iter<'a, T, CAPACITY> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.cursor?;

        self.cursor = self.links.next_of(position);
        self.remaining = self
            .remaining
            .checked_sub(1)
            .expect("used list is never longer than its counted length");

        let slot = self
            .slots
            .get(position)
            .expect("used list only links to slots in bounds");

        // SAFETY: The slot is in the used list, so it holds a live value that, per the
        // constructor's contract, is neither modified nor dropped during 'a.
        Some(unsafe { (*slot.get()).assume_init_ref() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, const CAPACITY: usize> ExactSizeIterator for Iter<'_, T, CAPACITY> {}
impl<T, const CAPACITY: usize> FusedIterator for Iter<'_, T, CAPACITY> {}

// Manual implementation because deriving would require `T: Clone`.
impl<T, const CAPACITY: usize> Clone for Iter<'_, T, CAPACITY> {
    fn clone(&self) -> Self {
        Self {
            links: self.links,
            slots: self.slots,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<T, const CAPACITY: usize> fmt::Debug for Iter<'_, T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

/// Iterator over exclusive references to the items of a [`SlotList`], front to back.
///
/// Returned by [`SlotList::iter_mut()`] and [`Locked::iter_mut()`][crate::Locked::iter_mut].
pub struct IterMut<'a, T, const CAPACITY: usize> {
    links: &'a Links<CAPACITY>,
    slots: &'a [Slot<T>; CAPACITY],
    cursor: Option<usize>,
    remaining: usize,

    _items: PhantomData<&'a mut T>,
}

impl<'a, T, const CAPACITY: usize> IterMut<'a, T, CAPACITY> {
    /// # Safety
    ///
    /// Every slot in the used list of `links` must hold a live value, and nothing other than
    /// this iterator may access any value in the used list for the lifetime `'a`.
    pub(crate) unsafe fn new(links: &'a Links<CAPACITY>, slots: &'a [Slot<T>; CAPACITY]) -> Self {
        Self {
            links,
            slots,
            cursor: links.head(),
            remaining: links.used_len(),
            _items: PhantomData,
        }
    }
}

impl<'a, T, const CAPACITY: usize> Iterator for IterMut<'a, T, CAPACITY> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.cursor?;

        self.cursor = self.links.next_of(position);
        self.remaining = self
            .remaining
            .checked_sub(1)
            .expect("used list is never longer than its counted length");

        let slot = self
            .slots
            .get(position)
            .expect("used list only links to slots in bounds");

        // SAFETY: The slot is in the used list, so it holds a live value. The constructor's
        // contract grants us exclusive access to it for 'a, and each slot appears in the used
        // list only once, so we never hand out two references to the same value.
        Some(unsafe { (*slot.get()).assume_init_mut() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, const CAPACITY: usize> ExactSizeIterator for IterMut<'_, T, CAPACITY> {}
impl<T, const CAPACITY: usize> FusedIterator for IterMut<'_, T, CAPACITY> {}

impl<T, const CAPACITY: usize> fmt::Debug for IterMut<'_, T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

/// Owning iterator that drains a [`SlotList`] front to back.
///
/// Returned by the `IntoIterator` implementation of [`SlotList`]. Items not yet yielded are
/// dropped together with the iterator.
pub struct IntoIter<T, const CAPACITY: usize> {
    list: SlotList<T, CAPACITY>,
}

impl<T, const CAPACITY: usize> IntoIter<T, CAPACITY> {
    pub(crate) fn new(list: SlotList<T, CAPACITY>) -> Self {
        Self { list }
    }
}

impl<T, const CAPACITY: usize> Iterator for IntoIter<T, CAPACITY> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.list.len();
        (len, Some(len))
    }
}

impl<T, const CAPACITY: usize> ExactSizeIterator for IntoIter<T, CAPACITY> {}
impl<T, const CAPACITY: usize> FusedIterator for IntoIter<T, CAPACITY> {}

impl<T, const CAPACITY: usize> fmt::Debug for IntoIter<T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter")
            .field("list", &self.list)
            .finish()
    }
}
