use crate::SlotIndex;

/// The link bookkeeping of a slot arena of `CAPACITY` slots: a singly linked free list and a
/// doubly linked used list threaded through the same per-slot `prev`/`next` fields.
///
/// This type knows nothing about the values stored in the slots. It only decides which slot
/// position is in which list and in what order. The owner of the arena is responsible for
/// initializing a slot's payload after it leaves the free list and for dropping it before it
/// returns there.
///
/// A slot position is always in exactly one of four states:
///
/// * free - threaded into the free list;
/// * reserved - taken from the free list by [`reserve()`][1] but not yet published;
/// * used - threaded into the used list;
/// * detached - taken from the used list by [`detach_front()`][2] but not yet released.
///
/// Reserved and detached slots are in neither list. They are owned by whoever reserved or
/// detached them, which is what allows payload construction and destruction to happen without
/// holding whatever lock guards this bookkeeping.
///
/// [1]: Self::reserve
/// [2]: Self::detach_front
#[derive(Debug)]
pub(crate) struct Links<const CAPACITY: usize> {
    prev: [SlotIndex; CAPACITY],
    next: [SlotIndex; CAPACITY],

    /// Top of the free stack. The most recently freed slot is reused first.
    free_head: SlotIndex,

    /// Oldest slot in the used list.
    head: SlotIndex,

    /// Most recently appended slot in the used list.
    tail: SlotIndex,

    /// Number of occupied slots. Counts used slots and detached slots that have not yet been
    /// released, as those still hold a live value.
    len: usize,

    pending_inserts: usize,
    pending_removals: usize,
}

impl<const CAPACITY: usize> Links<CAPACITY> {
    /// Creates the bookkeeping with every slot free, chained in index order.
    #[must_use]
    #[allow(
        clippy::indexing_slicing,
        clippy::arithmetic_side_effects,
        reason = "const fn cannot use the checked helpers; loop is bounded by CAPACITY"
    )]
    pub(crate) const fn new() -> Self {
        let mut next = [SlotIndex::NONE; CAPACITY];

        let mut position = 0;
        while position < CAPACITY {
            let following = position + 1;

            next[position] = if following < CAPACITY {
                SlotIndex::new(following)
            } else {
                SlotIndex::NONE
            };

            position = following;
        }

        Self {
            prev: [SlotIndex::NONE; CAPACITY],
            next,
            free_head: if CAPACITY > 0 {
                SlotIndex::new(0)
            } else {
                SlotIndex::NONE
            },
            head: SlotIndex::NONE,
            tail: SlotIndex::NONE,
            len: 0,
            pending_inserts: 0,
            pending_removals: 0,
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of slots currently threaded into the used list.
    #[must_use]
    pub(crate) fn used_len(&self) -> usize {
        self.len
            .checked_sub(self.pending_removals)
            .expect("every detached slot is still counted as occupied")
    }

    /// Whether no slot is currently reserved or detached.
    #[must_use]
    pub(crate) fn is_quiescent(&self) -> bool {
        self.pending_inserts == 0 && self.pending_removals == 0
    }

    #[must_use]
    pub(crate) fn head(&self) -> Option<usize> {
        self.head.get()
    }

    #[must_use]
    pub(crate) fn tail(&self) -> Option<usize> {
        self.tail.get()
    }

    /// The slot after `position` in whichever list `position` is in.
    #[must_use]
    pub(crate) fn next_of(&self, position: usize) -> Option<usize> {
        self.next(position).get()
    }

    /// Takes a slot from the free list, or returns `None` if there are no free slots.
    ///
    /// The slot is in neither list until it is either published or its reservation cancelled.
    #[must_use]
    pub(crate) fn reserve(&mut self) -> Option<usize> {
        let position = self.free_head.get()?;

        self.free_head = self.next(position);
        self.set_next(position, SlotIndex::NONE);

        self.pending_inserts = self
            .pending_inserts
            .checked_add(1)
            .expect("cannot have more reservations than slots");

        Some(position)
    }

    /// Returns a reserved slot to the free list without it ever having been published.
    pub(crate) fn cancel_reservation(&mut self, position: usize) {
        self.push_free(position);

        self.pending_inserts = self
            .pending_inserts
            .checked_sub(1)
            .expect("cancelled a reservation that was never made");
    }

    /// Appends a reserved slot to the tail of the used list.
    pub(crate) fn publish_back(&mut self, position: usize) {
        let index = SlotIndex::new(position);

        self.set_prev(position, self.tail);
        self.set_next(position, SlotIndex::NONE);

        match self.tail.get() {
            Some(tail) => self.set_next(tail, index),
            None => self.head = index,
        }

        self.tail = index;

        self.pending_inserts = self
            .pending_inserts
            .checked_sub(1)
            .expect("published a slot that was never reserved");
        self.len = self
            .len
            .checked_add(1)
            .expect("guarded by CAPACITY <= MAX_CAPACITY");
    }

    /// Takes the oldest slot out of the used list, or returns `None` if the used list is empty.
    ///
    /// The slot still counts as occupied until it is released.
    #[must_use]
    pub(crate) fn detach_front(&mut self) -> Option<usize> {
        let position = self.head.get()?;

        self.unlink(position);

        self.pending_removals = self
            .pending_removals
            .checked_add(1)
            .expect("cannot have more detached slots than slots");

        Some(position)
    }

    /// Returns a detached slot to the free list.
    pub(crate) fn release(&mut self, position: usize) {
        self.push_free(position);

        self.pending_removals = self
            .pending_removals
            .checked_sub(1)
            .expect("released a slot that was never detached");
        self.len = self
            .len
            .checked_sub(1)
            .expect("a detached slot is counted as occupied");
    }

    /// Moves a slot from anywhere in the used list straight to the free list.
    pub(crate) fn remove(&mut self, position: usize) {
        self.unlink(position);
        self.push_free(position);

        self.len = self
            .len
            .checked_sub(1)
            .expect("a used slot is counted as occupied");
    }

    /// Restores the state of a freshly created instance, with every slot free and chained in
    /// index order.
    ///
    /// # Panics
    ///
    /// Panics if any slot is occupied, reserved or detached.
    pub(crate) fn reset(&mut self) {
        assert!(
            self.len == 0 && self.is_quiescent(),
            "cannot reset slot links while {} slots are occupied and {} are in flight",
            self.len,
            self.pending_inserts.saturating_add(self.pending_removals)
        );

        *self = Self::new();
    }

    fn unlink(&mut self, position: usize) {
        let prev = self.prev(position);
        let next = self.next(position);

        match prev.get() {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }

        match next.get() {
            Some(next) => self.set_prev(next, prev),
            None => self.tail = prev,
        }

        self.set_prev(position, SlotIndex::NONE);
        self.set_next(position, SlotIndex::NONE);
    }

    fn push_free(&mut self, position: usize) {
        self.set_prev(position, SlotIndex::NONE);
        self.set_next(position, self.free_head);
        self.free_head = SlotIndex::new(position);
    }

    fn prev(&self, position: usize) -> SlotIndex {
        *self
            .prev
            .get(position)
            .unwrap_or_else(|| panic!("slot {position} out of bounds of {CAPACITY} slots"))
    }

    fn next(&self, position: usize) -> SlotIndex {
        *self
            .next
            .get(position)
            .unwrap_or_else(|| panic!("slot {position} out of bounds of {CAPACITY} slots"))
    }

    fn set_prev(&mut self, position: usize, value: SlotIndex) {
        *self
            .prev
            .get_mut(position)
            .unwrap_or_else(|| panic!("slot {position} out of bounds of {CAPACITY} slots")) = value;
    }

    fn set_next(&mut self, position: usize, value: SlotIndex) {
        *self
            .next
            .get_mut(position)
            .unwrap_or_else(|| panic!("slot {position} out of bounds of {CAPACITY} slots")) = value;
    }

    /// Walks both lists and verifies that every slot is accounted for exactly once and that
    /// all the counters agree with what the walk observed.
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(any(test, debug_assertions))]
    pub(crate) fn integrity_check(&self) {
        #[derive(Clone, Copy, PartialEq)]
        enum Seen {
            Nowhere,
            Used,
            Free,
        }

        let mut seen = [Seen::Nowhere; CAPACITY];

        // Used list, front to back, with back-links verified on the way.
        let mut observed_used: usize = 0;
        let mut expected_prev = SlotIndex::NONE;
        let mut cursor = self.head;

        while let Some(position) = cursor.get() {
            let mark = seen
                .get_mut(position)
                .unwrap_or_else(|| panic!("used list points out of bounds at slot {position}"));

            assert!(
                *mark == Seen::Nowhere,
                "slot {position} appears twice in the used list"
            );
            *mark = Seen::Used;

            assert!(
                self.prev(position) == expected_prev,
                "slot {position} has prev {:?} but follows {expected_prev:?}",
                self.prev(position)
            );

            observed_used = observed_used
                .checked_add(1)
                .expect("bounded by the duplicate check above");
            expected_prev = SlotIndex::new(position);
            cursor = self.next(position);
        }

        assert!(
            self.tail == expected_prev,
            "tail is {:?} but the used list ends at {expected_prev:?}",
            self.tail
        );

        assert!(
            observed_used == self.used_len(),
            "observed {observed_used} used slots but expected {}",
            self.used_len()
        );

        // Free list. Order is irrelevant but every entry must be unique and unlinked backwards.
        let mut observed_free: usize = 0;
        let mut cursor = self.free_head;

        while let Some(position) = cursor.get() {
            let mark = seen
                .get_mut(position)
                .unwrap_or_else(|| panic!("free list points out of bounds at slot {position}"));

            assert!(
                *mark == Seen::Nowhere,
                "slot {position} appears twice across the free and used lists"
            );
            *mark = Seen::Free;

            assert!(
                self.prev(position).is_none(),
                "free slot {position} has a prev link"
            );

            observed_free = observed_free
                .checked_add(1)
                .expect("bounded by the duplicate check above");
            cursor = self.next(position);
        }

        let in_flight = self
            .pending_inserts
            .checked_add(self.pending_removals)
            .expect("bounded by CAPACITY");

        assert!(
            observed_used
                .checked_add(observed_free)
                .and_then(|listed| listed.checked_add(in_flight))
                == Some(CAPACITY),
            "{observed_used} used + {observed_free} free + {in_flight} in flight != {CAPACITY} slots"
        );
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn used_positions<const CAPACITY: usize>(links: &Links<CAPACITY>) -> Vec<usize> {
        let mut positions = Vec::new();
        let mut cursor = links.head();

        while let Some(position) = cursor {
            positions.push(position);
            cursor = links.next_of(position);
        }

        positions
    }

    fn insert<const CAPACITY: usize>(links: &mut Links<CAPACITY>) -> usize {
        let position = links.reserve().unwrap();
        links.publish_back(position);
        position
    }

    #[test]
    fn new_chains_free_slots_in_order() {
        let mut links = Links::<4>::new();
        links.integrity_check();

        assert_eq!(links.len(), 0);
        assert_eq!(links.head(), None);
        assert_eq!(links.tail(), None);

        assert_eq!(links.reserve(), Some(0));
        assert_eq!(links.reserve(), Some(1));
        assert_eq!(links.reserve(), Some(2));
        assert_eq!(links.reserve(), Some(3));
        assert_eq!(links.reserve(), None);
    }

    #[test]
    fn publish_appends_in_order() {
        let mut links = Links::<3>::new();

        insert(&mut links);
        insert(&mut links);
        insert(&mut links);
        links.integrity_check();

        assert_eq!(used_positions(&links), vec![0, 1, 2]);
        assert_eq!(links.head(), Some(0));
        assert_eq!(links.tail(), Some(2));
        assert_eq!(links.len(), 3);
    }

    #[test]
    fn reservation_is_invisible_until_published() {
        let mut links = Links::<3>::new();

        let reserved = links.reserve().unwrap();
        links.integrity_check();

        assert_eq!(links.len(), 0);
        assert_eq!(links.head(), None);

        let other = insert(&mut links);
        assert_eq!(used_positions(&links), vec![other]);

        links.publish_back(reserved);
        links.integrity_check();
        assert_eq!(used_positions(&links), vec![other, reserved]);
    }

    #[test]
    fn cancelled_reservation_is_reused_first() {
        let mut links = Links::<3>::new();

        let reserved = links.reserve().unwrap();
        links.cancel_reservation(reserved);
        links.integrity_check();

        assert_eq!(links.len(), 0);
        assert_eq!(links.reserve(), Some(reserved));
    }

    #[test]
    fn detach_front_then_release() {
        let mut links = Links::<3>::new();

        let a = insert(&mut links);
        let b = insert(&mut links);

        assert_eq!(links.detach_front(), Some(a));
        links.integrity_check();

        // Detached slots still count as occupied until released.
        assert_eq!(links.len(), 2);
        assert_eq!(links.used_len(), 1);
        assert_eq!(links.head(), Some(b));
        assert_eq!(links.tail(), Some(b));

        links.release(a);
        links.integrity_check();
        assert_eq!(links.len(), 1);

        assert_eq!(links.detach_front(), Some(b));
        assert_eq!(links.head(), None);
        assert_eq!(links.tail(), None);
        links.release(b);

        assert_eq!(links.detach_front(), None);
        links.integrity_check();
    }

    #[test]
    fn freed_slot_is_reused_lifo() {
        let mut links = Links::<3>::new();

        let a = insert(&mut links);
        let b = insert(&mut links);
        let _c = insert(&mut links);

        links.remove(a);
        links.remove(b);

        assert_eq!(links.reserve(), Some(b));
        assert_eq!(links.reserve(), Some(a));
        assert_eq!(links.reserve(), None);
    }

    #[test]
    fn remove_from_middle_head_and_tail() {
        let mut links = Links::<5>::new();

        for _ in 0..5 {
            insert(&mut links);
        }

        links.remove(2);
        links.integrity_check();
        assert_eq!(used_positions(&links), vec![0, 1, 3, 4]);

        links.remove(0);
        links.integrity_check();
        assert_eq!(used_positions(&links), vec![1, 3, 4]);
        assert_eq!(links.head(), Some(1));

        links.remove(4);
        links.integrity_check();
        assert_eq!(used_positions(&links), vec![1, 3]);
        assert_eq!(links.tail(), Some(3));

        links.remove(1);
        links.remove(3);
        links.integrity_check();
        assert_eq!(links.head(), None);
        assert_eq!(links.tail(), None);
        assert_eq!(links.len(), 0);
    }

    #[test]
    fn reset_restores_index_order() {
        let mut links = Links::<3>::new();

        let a = insert(&mut links);
        let b = insert(&mut links);
        links.remove(a);
        links.remove(b);

        links.reset();
        links.integrity_check();

        assert_eq!(links.reserve(), Some(0));
        assert_eq!(links.reserve(), Some(1));
        assert_eq!(links.reserve(), Some(2));
    }

    #[test]
    #[should_panic]
    fn reset_with_occupied_slots_panics() {
        let mut links = Links::<3>::new();
        insert(&mut links);

        links.reset();
    }

    #[test]
    #[should_panic]
    fn reset_with_reservation_panics() {
        let mut links = Links::<3>::new();
        _ = links.reserve();

        links.reset();
    }

    #[test]
    fn single_slot() {
        let mut links = Links::<1>::new();

        let a = insert(&mut links);
        assert_eq!(links.reserve(), None);
        assert_eq!(links.head(), Some(a));
        assert_eq!(links.tail(), Some(a));

        links.remove(a);
        links.integrity_check();
        assert_eq!(links.reserve(), Some(a));
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_position_panics() {
        let links = Links::<3>::new();
        _ = links.next_of(3);
    }
}
