use std::any::type_name;
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

use scopeguard::ScopeGuard;
use tracing::{debug, trace};

use crate::{
    DropPolicy, Full, IntoIter, Iter, IterMut, Links, Locked, MAX_CAPACITY, SlotListBuilder,
};

/// Storage for one element. Initialized exactly while the slot is occupied.
pub(crate) type Slot<T> = UnsafeCell<MaybeUninit<T>>;

/// A fixed-capacity, thread-safe FIFO linked list that never allocates.
///
/// All `CAPACITY` slots are stored inline in the list itself, so a list placed in a `static`,
/// on the stack or inside another struct never touches the heap. Items are appended at the back
/// and taken from the front; items anywhere in the list can also be removed selectively via
/// [`remove_if()`][1].
///
/// Every operation takes `&self`, so a list can be shared between threads (e.g. via `Arc` or a
/// `static`) with multiple producers and consumers. A single lock per list guards the slot
/// links. Constructing, moving out and dropping items happens outside the lock, except for
/// [`remove_if()`][1] and [`clear()`][2], which visit every item under one lock acquisition.
///
/// # Capacity
///
/// Insertion into a full list fails immediately with [`Full`], handing the rejected input back.
/// Removal from an empty list returns `None`. Nothing ever blocks waiting for space or data.
///
/// `CAPACITY` must be between 1 and [`MAX_CAPACITY`]; other values fail to compile.
///
/// # Examples
///
/// ```
/// use slot_list::SlotList;
///
/// let list = SlotList::<u32, 4>::new();
///
/// list.push_back(1).unwrap();
/// list.push_back(2).unwrap();
/// list.push_back(3).unwrap();
///
/// assert_eq!(list.len(), 3);
/// assert_eq!(list.pop_front(), Some(1));
///
/// list.remove_if(|item| *item == 3);
///
/// assert_eq!(list.pop_front(), Some(2));
/// assert_eq!(list.pop_front(), None);
/// ```
///
/// [1]: Self::remove_if
/// [2]: Self::clear
pub struct SlotList<T, const CAPACITY: usize> {
    links: Mutex<Links<CAPACITY>>,

    /// Payload storage. A slot's payload is only touched by the thread that currently owns the
    /// slot (reserved for insertion or detached for removal) or by a holder of the lock (slot
    /// is in the used list).
    slots: [Slot<T>; CAPACITY],

    drop_policy: DropPolicy,
}

impl<T, const CAPACITY: usize> SlotList<T, CAPACITY> {
    /// Creates an empty list with the default configuration.
    ///
    /// This is a `const fn`, so the list can be used as a `static`:
    ///
    /// ```
    /// use slot_list::SlotList;
    ///
    /// static EVENTS: SlotList<u64, 32> = SlotList::new();
    ///
    /// EVENTS.push_back(7).unwrap();
    /// assert_eq!(EVENTS.pop_front(), Some(7));
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::new_inner(DropPolicy::MayDropItems)
    }

    /// Starts building a new [`SlotList`].
    ///
    /// Use this when you want to customize the list configuration beyond the defaults.
    pub fn builder() -> SlotListBuilder<T, CAPACITY> {
        SlotListBuilder::new()
    }

    #[must_use]
    pub(crate) const fn new_inner(drop_policy: DropPolicy) -> Self {
        const {
            assert!(CAPACITY > 0, "SlotList must have non-zero capacity");
            assert!(
                CAPACITY <= MAX_CAPACITY,
                "SlotList capacity must not exceed MAX_CAPACITY"
            );
        }

        Self {
            links: Mutex::new(Links::new()),
            slots: [const { UnsafeCell::new(MaybeUninit::uninit()) }; CAPACITY],
            drop_policy,
        }
    }

    /// The number of items in the list.
    ///
    /// Items that another thread is in the middle of removing are still counted until their
    /// removal completes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links().len()
    }

    /// Whether the list contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every slot of the list is occupied.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == CAPACITY
    }

    /// The maximum number of items the list can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Appends a value to the back of the list.
    ///
    /// # Errors
    ///
    /// Returns [`Full`] with the value if every slot is occupied.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_list::SlotList;
    ///
    /// let list = SlotList::<&str, 2>::new();
    ///
    /// assert!(list.push_back("a").is_ok());
    /// assert!(list.push_back("b").is_ok());
    /// assert_eq!(list.push_back("c").unwrap_err().into_inner(), "c");
    /// ```
    pub fn push_back(&self, value: T) -> Result<(), Full<T>> {
        let reserved = self.links().reserve();

        let Some(position) = reserved else {
            return Err(Self::reject(value));
        };

        // SAFETY: We reserved the slot above and the closure initializes it.
        unsafe {
            self.construct_and_publish(position, |slot| {
                slot.write(value);
            });
        }

        Ok(())
    }

    /// Appends the value returned by `f` to the back of the list.
    ///
    /// `f` is only called if a slot is available. It runs without holding the list lock, so it
    /// may be arbitrarily expensive and may itself use the list. The new item becomes visible
    /// to other operations only after `f` returns.
    ///
    /// If `f` panics, the slot reserved for the item is returned to the list and the list is
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Full`] with the uncalled `f` if every slot is occupied.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_list::SlotList;
    ///
    /// let list = SlotList::<Vec<u8>, 2>::new();
    ///
    /// list.push_back_with(|| vec![0; 1024]).unwrap();
    ///
    /// assert_eq!(list.pop_front().map(|buffer| buffer.len()), Some(1024));
    /// ```
    pub fn push_back_with<F>(&self, f: F) -> Result<(), Full<F>>
    where
        F: FnOnce() -> T,
    {
        let reserved = self.links().reserve();

        let Some(position) = reserved else {
            return Err(Self::reject(f));
        };

        // SAFETY: We reserved the slot above and the closure initializes it.
        unsafe {
            self.construct_and_publish(position, |slot| {
                slot.write(f());
            });
        }

        Ok(())
    }

    /// Appends an item to the back of the list by initializing its storage in place.
    ///
    /// `f` receives the uninitialized storage of the slot reserved for the new item. This avoids
    /// constructing the item elsewhere and moving it in. Like with
    /// [`push_back_with()`][Self::push_back_with], `f` runs without holding the list lock and
    /// the item becomes visible only after `f` returns.
    ///
    /// If `f` panics, the storage is treated as uninitialized (nothing is dropped) and the slot
    /// is returned to the list.
    ///
    /// # Errors
    ///
    /// Returns [`Full`] with the uncalled `f` if every slot is occupied.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `f` fully initializes the `MaybeUninit<T>` before returning.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::mem::MaybeUninit;
    ///
    /// use slot_list::SlotList;
    ///
    /// struct Frame {
    ///     sequence: u32,
    ///     payload: [u8; 256],
    /// }
    ///
    /// let list = SlotList::<Frame, 4>::new();
    ///
    /// // SAFETY: Every field is initialized before the closure returns.
    /// unsafe {
    ///     list.emplace_back(|uninit: &mut MaybeUninit<Frame>| {
    ///         let ptr = uninit.as_mut_ptr();
    ///         // SAFETY: The pointer is valid for writes of the fields.
    ///         unsafe {
    ///             (&raw mut (*ptr).sequence).write(1);
    ///             (&raw mut (*ptr).payload).write([0xAB; 256]);
    ///         }
    ///     })
    /// }
    /// .unwrap();
    ///
    /// let frame = list.pop_front().unwrap();
    /// assert_eq!(frame.sequence, 1);
    /// assert_eq!(frame.payload[255], 0xAB);
    /// ```
    pub unsafe fn emplace_back<F>(&self, f: F) -> Result<(), Full<F>>
    where
        F: FnOnce(&mut MaybeUninit<T>),
    {
        let reserved = self.links().reserve();

        let Some(position) = reserved else {
            return Err(Self::reject(f));
        };

        // SAFETY: We reserved the slot above. Initialization is forwarded to the caller.
        unsafe {
            self.construct_and_publish(position, f);
        }

        Ok(())
    }

    /// Removes the item at the front of the list and returns it, or `None` if the list is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_list::SlotList;
    ///
    /// let list = SlotList::<u32, 4>::new();
    /// assert_eq!(list.pop_front(), None);
    ///
    /// list.push_back(1).unwrap();
    /// list.push_back(2).unwrap();
    ///
    /// assert_eq!(list.pop_front(), Some(1));
    /// assert_eq!(list.pop_front(), Some(2));
    /// ```
    #[must_use]
    pub fn pop_front(&self) -> Option<T> {
        let position = self.links().detach_front()?;

        // SAFETY: A detached slot holds a live value and is in neither list, so we are the only
        // ones touching it until we release it. Reading moves the value out, after which the
        // slot is treated as uninitialized.
        let value = unsafe { self.slot_ptr(position).read() };

        self.links().release(position);

        Some(value)
    }

    /// Removes the item at the front of the list, passing it to `f` before dropping it.
    ///
    /// Returns the result of `f`, or `None` without calling `f` if the list is empty.
    ///
    /// `f` runs without holding the list lock and may itself use the list. The item is dropped
    /// and its slot freed even if `f` panics.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_list::SlotList;
    ///
    /// let list = SlotList::<String, 4>::new();
    /// list.push_back("hello".to_string()).unwrap();
    ///
    /// let length = list.consume_front(|item| {
    ///     item.push_str(" world");
    ///     item.len()
    /// });
    ///
    /// assert_eq!(length, Some(11));
    /// assert!(list.is_empty());
    /// ```
    pub fn consume_front<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let position = self.links().detach_front()?;

        let _consumed = scopeguard::guard(position, |position| {
            // SAFETY: The slot was detached above and still holds the live value. The guard
            // runs once, after `f` is done with the value.
            unsafe {
                self.drop_and_release(position);
            }
        });

        // SAFETY: A detached slot holds a live value and is in neither list, so we have
        // exclusive access to it until the guard above releases it.
        let value = unsafe { &mut *self.slot_ptr(position) };

        Some(f(value))
    }

    /// Removes every item for which `predicate` returns `true`, returning how many were removed.
    ///
    /// Items are visited front to back. The relative order of the remaining items is preserved.
    ///
    /// The whole scan, including the calls to `predicate` and the dropping of removed items,
    /// runs under a single acquisition of the list lock. `predicate` must therefore not use the
    /// same list, or it will deadlock. The same applies to the `Drop` implementation of `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_list::SlotList;
    ///
    /// let list = SlotList::<u32, 8>::new();
    ///
    /// for value in 1..=5 {
    ///     list.push_back(value).unwrap();
    /// }
    ///
    /// assert_eq!(list.remove_if(|value| value % 2 == 0), 2);
    /// assert_eq!(list.lock().iter().copied().collect::<Vec<_>>(), [1, 3, 5]);
    /// ```
    pub fn remove_if(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let mut links = self.links();

        let mut removed: usize = 0;
        let mut cursor = links.head();

        while let Some(position) = cursor {
            cursor = links.next_of(position);

            // SAFETY: Slots in the used list hold live values and cannot leave the list while
            // we hold the lock.
            let value = unsafe { &*self.slot_ptr(position) };

            if !predicate(value) {
                continue;
            }

            // The slot is freed before the value is dropped, so a panicking destructor leaves
            // the links consistent. Nobody can reserve the slot while we hold the lock.
            links.remove(position);

            // SAFETY: The value is live and no longer reachable through the links, so this is
            // the only place that drops it.
            unsafe {
                self.slot_ptr(position).drop_in_place();
            }

            removed = removed.checked_add(1).expect("bounded by CAPACITY");
        }

        trace!(
            removed,
            item_type = type_name::<T>(),
            "removed items matching predicate"
        );

        removed
    }

    /// Drops every item in the list.
    ///
    /// Calling this on an empty list is a no-op.
    pub fn clear(&self) {
        self.clear_with(|_| {});
    }

    /// Passes every item in the list to `visitor`, front to back, dropping each after the visit.
    ///
    /// The whole operation runs under a single acquisition of the list lock. `visitor` must
    /// therefore not use the same list, or it will deadlock. If `visitor` panics, the item it
    /// was visiting is still dropped and the items not yet visited remain in the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_list::SlotList;
    ///
    /// let list = SlotList::<u32, 4>::new();
    /// list.push_back(10).unwrap();
    /// list.push_back(20).unwrap();
    ///
    /// let mut total = 0;
    /// list.clear_with(|value| total += *value);
    ///
    /// assert_eq!(total, 30);
    /// assert!(list.is_empty());
    /// ```
    pub fn clear_with(&self, mut visitor: impl FnMut(&mut T)) {
        let mut links = self.links();

        let mut cleared: usize = 0;

        while let Some(position) = links.head() {
            // Nobody can reserve the freed slot while we hold the lock, so the value stays ours
            // until it is dropped below.
            links.remove(position);

            let drop_guard = scopeguard::guard(self.slot_ptr(position), |value| {
                // SAFETY: The value is live and no longer reachable through the links, so this
                // is the only place that drops it. Runs even if the visitor panics.
                unsafe {
                    value.drop_in_place();
                }
            });

            let value: *mut T = *drop_guard;

            // SAFETY: See above. The guard does not drop the value until the visitor is done.
            visitor(unsafe { &mut *value });

            cleared = cleared.checked_add(1).expect("bounded by CAPACITY");
        }

        if links.is_quiescent() {
            links.reset();
        } else {
            // Another thread owns a reserved or detached slot. Putting every slot back in index
            // order would hand that slot out twice, so we keep the free list as it is.
            debug!(
                item_type = type_name::<T>(),
                "skipping slot link reset because another thread has an operation in flight"
            );
        }

        #[cfg(debug_assertions)]
        links.integrity_check();

        trace!(cleared, item_type = type_name::<T>(), "cleared slot list");
    }

    /// Locks the list and returns a guard for inspecting and modifying the items in place.
    ///
    /// While the guard exists, operations on the list from other threads block. Calling any
    /// method of the list from the thread that holds the guard deadlocks.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_list::SlotList;
    ///
    /// let list = SlotList::<u32, 4>::new();
    /// list.push_back(1).unwrap();
    /// list.push_back(2).unwrap();
    ///
    /// {
    ///     let mut locked = list.lock();
    ///
    ///     for value in locked.iter_mut() {
    ///         *value *= 10;
    ///     }
    ///
    ///     assert_eq!(locked.front(), Some(&10));
    ///     assert_eq!(locked.back(), Some(&20));
    /// }
    ///
    /// assert_eq!(list.pop_front(), Some(10));
    /// ```
    pub fn lock(&self) -> Locked<'_, T, CAPACITY> {
        // SAFETY: We hand over the lock guard together with the slots it governs.
        unsafe { Locked::new(self.links(), &self.slots) }
    }

    /// Returns an iterator over shared references to the items, front to back.
    ///
    /// This does not take the list lock because the exclusive borrow already guarantees that
    /// nothing else is using the list. Use [`lock()`][Self::lock] to iterate a shared list.
    pub fn iter(&mut self) -> Iter<'_, T, CAPACITY> {
        let links = self.links.get_mut().unwrap_or_else(PoisonError::into_inner);

        // SAFETY: The exclusive borrow of the list guarantees that no slot is reserved or
        // detached and that nothing modifies any value for the lifetime of the iterator.
        unsafe { Iter::new(links, &self.slots) }
    }

    /// Returns an iterator over exclusive references to the items, front to back.
    ///
    /// This does not take the list lock because the exclusive borrow already guarantees that
    /// nothing else is using the list.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, CAPACITY> {
        let links = self.links.get_mut().unwrap_or_else(PoisonError::into_inner);

        // SAFETY: The exclusive borrow of the list guarantees that no slot is reserved or
        // detached and that nothing else accesses any value for the lifetime of the iterator.
        unsafe { IterMut::new(links, &self.slots) }
    }

    fn links(&self) -> MutexGuard<'_, Links<CAPACITY>> {
        // The links are consistent whenever a callback that could panic runs under the lock,
        // so a poisoned lock carries no broken invariants.
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot_ptr(&self, position: usize) -> *mut T {
        self.slots
            .get(position)
            .unwrap_or_else(|| {
                panic!(
                    "slot {position} out of bounds in slot list of {}",
                    type_name::<T>()
                )
            })
            .get()
            .cast::<T>()
    }

    fn reject<V>(rejected: V) -> Full<V> {
        trace!(
            capacity = CAPACITY,
            item_type = type_name::<T>(),
            "rejected insertion into full slot list"
        );

        Full::new(rejected, CAPACITY)
    }

    /// Initializes a reserved slot via `init` and appends it to the back of the used list.
    ///
    /// If `init` panics, the reservation is cancelled and nothing is dropped.
    ///
    /// # Safety
    ///
    /// The slot must have been reserved by the caller and `init` must fully initialize it.
    unsafe fn construct_and_publish(&self, position: usize, init: impl FnOnce(&mut MaybeUninit<T>)) {
        let reservation = scopeguard::guard(position, |position| {
            self.links().cancel_reservation(position);
        });

        // SAFETY: A reserved slot is in neither list, so nothing else touches its storage until
        // we publish it.
        let storage = unsafe {
            &mut *self
                .slots
                .get(position)
                .expect("reserved slot is always in bounds")
                .get()
        };

        init(storage);

        let position = ScopeGuard::into_inner(reservation);
        self.links().publish_back(position);
    }

    /// Drops the value in a detached slot and releases the slot.
    ///
    /// The slot is released even if the value's destructor panics.
    ///
    /// # Safety
    ///
    /// The slot must have been detached by the caller and must still hold a live value.
    unsafe fn drop_and_release(&self, position: usize) {
        let _release = scopeguard::guard(position, |position| {
            self.links().release(position);
        });

        // SAFETY: Forwarding the guarantees of the caller.
        unsafe {
            self.slot_ptr(position).drop_in_place();
        }
    }
}

impl<T, const CAPACITY: usize> Default for SlotList<T, CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CAPACITY: usize> Drop for SlotList<T, CAPACITY> {
    fn drop(&mut self) {
        let remaining = self
            .links
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .len();

        if remaining > 0 {
            trace!(
                remaining,
                item_type = type_name::<T>(),
                "dropping slot list that still contains items"
            );
        }

        self.clear();

        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropItems && !thread::panicking() {
            assert!(
                remaining == 0,
                "dropped a non-empty slot list of {} with a policy that says it must be empty when dropped",
                type_name::<T>()
            );
        }
    }
}

impl<T, const CAPACITY: usize> fmt::Debug for SlotList<T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotList")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("len", &self.len())
            .field("capacity", &CAPACITY)
            .field("drop_policy", &self.drop_policy)
            .finish_non_exhaustive()
    }
}

// SAFETY: A value is only ever accessed by one thread at a time: the thread that reserved or
// detached its slot, or the thread holding the lock while the slot is in the used list. That is
// the contract of `Mutex<T>`, so the same bound applies. Sharing references obtained through
// `Locked` with other threads additionally requires `T: Sync`, enforced where that happens.
unsafe impl<T: Send, const CAPACITY: usize> Sync for SlotList<T, CAPACITY> {}

impl<T, const CAPACITY: usize> IntoIterator for SlotList<T, CAPACITY> {
    type Item = T;
    type IntoIter = IntoIter<T, CAPACITY>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, const CAPACITY: usize> IntoIterator for &'a mut SlotList<T, CAPACITY> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, CAPACITY>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
