/// The largest capacity a [`SlotList`][crate::SlotList] can be declared with.
///
/// Slot links are stored as 16-bit signed integers with `-1` reserved as the terminator, which
/// bounds the number of addressable slots.
pub const MAX_CAPACITY: usize = 32_767;

/// A link from one slot to another, or the terminator if there is no such slot.
///
/// This is the "pointer" of the list. Keeping it narrow keeps the per-slot bookkeeping at
/// four bytes regardless of the element type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SlotIndex(i16);

impl SlotIndex {
    /// No link: end of a list, or no free slot.
    pub(crate) const NONE: Self = Self(-1);

    /// # Panics
    ///
    /// Panics if `position` is not addressable by a slot index.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "guarded by MAX_CAPACITY assertion, which fits in i16"
    )]
    pub(crate) const fn new(position: usize) -> Self {
        assert!(
            position < MAX_CAPACITY,
            "slot position does not fit in a slot index"
        );

        Self(position as i16)
    }

    /// The slot position this link points at, or `None` for the terminator.
    #[must_use]
    pub(crate) fn get(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }

    #[must_use]
    pub(crate) const fn is_none(self) -> bool {
        self.0 < 0
    }
}
