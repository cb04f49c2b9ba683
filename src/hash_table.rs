use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use log::trace;

use crate::config::HASH_MIX;
use crate::config::INITIAL_CAPACITY;
use crate::config::MAX_NEIGHBORHOOD;
use crate::config::PRIME_MULTIPLIER;
use crate::config::max_population;
use crate::element_store::ElementKey;
use crate::element_store::ElementStore;

/// Cyclic `index + offset` over a table of `capacity` slots.
///
/// Requires `index < capacity` and `offset <= capacity`.
#[inline(always)]
pub(crate) fn add_index(index: usize, offset: usize, capacity: usize) -> usize {
    let sum = index + offset;
    if sum >= capacity { sum - capacity } else { sum }
}

/// Cyclic `index - offset` over a table of `capacity` slots.
///
/// `sub_index(to, from, capacity)` is the forward distance from `from` to
/// `to`. Requires `index < capacity` and `offset <= capacity`.
#[inline(always)]
pub(crate) fn sub_index(index: usize, offset: usize, capacity: usize) -> usize {
    if index < offset {
        index + capacity - offset
    } else {
        index - offset
    }
}

/// Maps an external hash onto a bucket of a `capacity`-slot table.
#[inline(always)]
pub(crate) fn ideal_bucket(hash: u64, capacity: usize) -> usize {
    ((hash ^ HASH_MIX).wrapping_mul(PRIME_MULTIPLIER) % capacity as u64) as usize
}

const OVERFLOW_BIT: u32 = 1 << MAX_NEIGHBORHOOD;
const OCCUPIED_BIT: u32 = 1 << (MAX_NEIGHBORHOOD + 1);
const OFFSET_BITS: u32 = OVERFLOW_BIT - 1;

/// Per-slot metadata packed into one word.
///
/// Bit `i < MAX_NEIGHBORHOOD` means the element whose ideal bucket is this
/// slot sits `i` slots ahead. The two bits above the offsets flag overflowed
/// elements homed here and occupancy of the slot itself. The flags sit above
/// the largest neighborhood so growing the neighborhood never moves them.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SlotMask(u32);

impl SlotMask {
    #[inline(always)]
    pub(crate) fn has_offset(self, offset: usize) -> bool {
        debug_assert!(offset < MAX_NEIGHBORHOOD);
        self.0 & (1 << offset) != 0
    }

    #[inline(always)]
    pub(crate) fn set_offset(&mut self, offset: usize) {
        debug_assert!(!self.has_offset(offset));
        self.0 |= 1 << offset;
    }

    #[inline(always)]
    pub(crate) fn clear_offset(&mut self, offset: usize) {
        debug_assert!(self.has_offset(offset));
        self.0 &= !(1 << offset);
    }

    /// Set offsets in ascending order.
    #[inline(always)]
    pub(crate) fn offsets(self) -> Offsets {
        Offsets(self.0 & OFFSET_BITS)
    }

    #[inline(always)]
    pub(crate) fn has_overflow(self) -> bool {
        self.0 & OVERFLOW_BIT != 0
    }

    #[inline(always)]
    pub(crate) fn set_overflow(&mut self) {
        self.0 |= OVERFLOW_BIT;
    }

    #[inline(always)]
    pub(crate) fn is_occupied(self) -> bool {
        self.0 & OCCUPIED_BIT != 0
    }

    #[inline(always)]
    pub(crate) fn set_occupied(&mut self) {
        debug_assert!(!self.is_occupied());
        self.0 |= OCCUPIED_BIT;
    }

    #[inline(always)]
    pub(crate) fn clear_occupied(&mut self) {
        debug_assert!(self.is_occupied());
        self.0 &= !OCCUPIED_BIT;
    }
}

impl Debug for SlotMask {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}{}{:0width$b}",
            if self.is_occupied() { 'O' } else { '.' },
            if self.has_overflow() { 'F' } else { '.' },
            self.0 & OFFSET_BITS,
            width = MAX_NEIGHBORHOOD
        )
    }
}

pub(crate) struct Offsets(u32);

impl Iterator for Offsets {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let offset = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(offset)
    }
}

#[derive(Clone, Copy, Default)]
struct Slot {
    mask: SlotMask,
    /// Meaningful only while `mask.is_occupied()`.
    element: ElementKey,
}

/// Where a located element physically lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    /// In the bucket array at this slot index.
    Table(usize),
    /// In the overflow list at this position.
    Overflow(usize),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Location {
    pub(crate) element: ElementKey,
    pub(crate) placement: Placement,
}

/// The bucket array and overflow list of a hopscotch map.
///
/// The table never owns keys or values. Every slot and overflow entry refers
/// to an element of an [`ElementStore`], which also caches each element's
/// ideal bucket for the current capacity.
pub(crate) struct BucketTable {
    slots: Box<[Slot]>,
    overflow: Vec<ElementKey>,
    neighborhood: usize,
}

impl Debug for BucketTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BucketTable")
            .field("capacity", &self.capacity())
            .field("neighborhood", &self.neighborhood)
            .field(
                "slots",
                &self.slots.iter().map(|s| s.mask).collect::<Vec<_>>(),
            )
            .field("overflow", &self.overflow.len())
            .finish()
    }
}

impl BucketTable {
    pub(crate) fn new(capacity: usize, neighborhood: usize) -> Self {
        debug_assert!(capacity >= INITIAL_CAPACITY);
        debug_assert!(neighborhood <= MAX_NEIGHBORHOOD && neighborhood < capacity);

        Self {
            slots: vec![Slot::default(); capacity].into_boxed_slice(),
            overflow: Vec::new(),
            neighborhood,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn neighborhood(&self) -> usize {
        self.neighborhood
    }

    #[inline]
    pub(crate) fn max_population(&self) -> usize {
        max_population(self.capacity())
    }

    #[inline]
    pub(crate) fn ideal_bucket(&self, hash: u64) -> usize {
        ideal_bucket(hash, self.capacity())
    }

    /// Looks up the element homed at `bucket` whose key satisfies `eq`.
    ///
    /// The neighborhood is scanned through the offset bits. The overflow list
    /// is only consulted when `bucket` has its overflow bit set.
    pub(crate) fn find<K, V>(
        &self,
        bucket: usize,
        store: &ElementStore<K, V>,
        eq: impl Fn(&K) -> bool,
    ) -> Option<Location> {
        let capacity = self.capacity();
        let mask = self.slots[bucket].mask;

        for offset in mask.offsets() {
            let index = add_index(bucket, offset, capacity);
            let element = self.slots[index].element;
            if eq(&store[element].key) {
                return Some(Location {
                    element,
                    placement: Placement::Table(index),
                });
            }
        }

        if mask.has_overflow() {
            return self.find_overflow(bucket, store, eq);
        }

        None
    }

    #[cold]
    #[inline(never)]
    fn find_overflow<K, V>(
        &self,
        bucket: usize,
        store: &ElementStore<K, V>,
        eq: impl Fn(&K) -> bool,
    ) -> Option<Location> {
        self.overflow
            .iter()
            .enumerate()
            .find_map(|(position, &element)| {
                let candidate = &store[element];
                (candidate.bucket == bucket && eq(&candidate.key)).then_some(Location {
                    element,
                    placement: Placement::Overflow(position),
                })
            })
    }

    /// Places `element` within the neighborhood of its cached ideal bucket,
    /// displacing other elements forward as needed.
    ///
    /// Falls back to the overflow list when no chain of legal moves brings a
    /// free slot into range. Does not check for duplicates or load.
    pub(crate) fn place<K, V>(
        &mut self,
        element: ElementKey,
        store: &ElementStore<K, V>,
    ) -> Placement {
        let capacity = self.capacity();
        let ideal = store[element].bucket;

        let Some(mut free) = self.find_next_unoccupied(ideal) else {
            return self.push_overflow(ideal, element);
        };

        // Every slot in [ideal, free) is occupied, so walking `cursor` back
        // from `free` only ever visits live elements.
        let mut cursor = free;
        while sub_index(free, ideal, capacity) >= self.neighborhood && cursor != ideal {
            cursor = sub_index(cursor, 1, capacity);
            let home = store[self.slots[cursor].element].bucket;
            if sub_index(free, home, capacity) < self.neighborhood {
                self.relocate(cursor, free, home);
                free = cursor;
            }
        }

        let offset = sub_index(free, ideal, capacity);
        if offset >= self.neighborhood {
            return self.push_overflow(ideal, element);
        }

        let slot = &mut self.slots[free];
        slot.element = element;
        slot.mask.set_occupied();
        self.slots[ideal].mask.set_offset(offset);

        Placement::Table(free)
    }

    /// Moves the occupant of `from` (homed at `home`) into the empty slot `to`.
    fn relocate(&mut self, from: usize, to: usize, home: usize) {
        let capacity = self.capacity();
        debug_assert!(self.slots[from].mask.is_occupied());
        debug_assert!(!self.slots[to].mask.is_occupied());

        let home_mask = &mut self.slots[home].mask;
        home_mask.clear_offset(sub_index(from, home, capacity));
        home_mask.set_offset(sub_index(to, home, capacity));

        let moved = core::mem::take(&mut self.slots[from].element);
        self.slots[from].mask.clear_occupied();

        let target = &mut self.slots[to];
        target.element = moved;
        target.mask.set_occupied();
    }

    fn find_next_unoccupied(&self, start: usize) -> Option<usize> {
        let capacity = self.capacity();
        (0..capacity)
            .map(|offset| add_index(start, offset, capacity))
            .find(|&index| !self.slots[index].mask.is_occupied())
    }

    #[cold]
    #[inline(never)]
    fn push_overflow(&mut self, bucket: usize, element: ElementKey) -> Placement {
        trace!(
            "neighborhood of bucket {bucket} exhausted, overflowing ({} overflow entries)",
            self.overflow.len() + 1
        );
        self.slots[bucket].mask.set_overflow();
        self.overflow.push(element);
        Placement::Overflow(self.overflow.len() - 1)
    }

    /// Detaches a located element from the table.
    ///
    /// `bucket` must be the element's cached ideal bucket. An overflow bit is
    /// left set even when its last overflow entry goes away; a stale bit only
    /// costs a failed overflow scan.
    pub(crate) fn erase(&mut self, location: Location, bucket: usize) {
        match location.placement {
            Placement::Overflow(position) => {
                debug_assert_eq!(self.overflow[position], location.element);
                self.overflow.swap_remove(position);
            }
            Placement::Table(index) => {
                debug_assert_eq!(self.slots[index].element, location.element);
                let offset = sub_index(index, bucket, self.capacity());
                self.slots[bucket].mask.clear_offset(offset);

                let slot = &mut self.slots[index];
                slot.mask.clear_occupied();
                slot.element = ElementKey::default();
            }
        }
    }

    /// Empties every slot and the overflow list, keeping capacity and
    /// neighborhood size.
    pub(crate) fn clear(&mut self) {
        self.slots.fill(Slot::default());
        self.overflow.clear();
    }

    /// Builds a table of the given dimensions holding every element of
    /// `store`, placed in store order.
    ///
    /// Each element's cached ideal bucket is recomputed for the new capacity,
    /// so any previous table over the same store is obsolete afterwards.
    pub(crate) fn build<K, V>(
        capacity: usize,
        neighborhood: usize,
        store: &mut ElementStore<K, V>,
    ) -> Self {
        debug_assert!(store.len() <= max_population(capacity));
        let mut table = Self::new(capacity, neighborhood);

        let mut cursor = store.head();
        while let Some(element) = cursor {
            let bucket = table.ideal_bucket(store[element].hash);
            store[element].bucket = bucket;
            table.place(element, store);
            cursor = store.next_of(element);
        }

        table
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn stats(&self, populated: usize) -> TableStats {
        let occupied_slots = self
            .slots
            .iter()
            .filter(|s| s.mask.is_occupied())
            .count();
        let overflow_buckets = self
            .slots
            .iter()
            .filter(|s| s.mask.has_overflow())
            .count();

        TableStats {
            populated,
            capacity: self.capacity(),
            neighborhood: self.neighborhood,
            max_population: self.max_population(),
            occupied_slots,
            overflow_entries: self.overflow.len(),
            overflow_buckets,
            load_factor: populated as f64 / self.capacity() as f64,
        }
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn probe_histogram(&self) -> ProbeHistogram {
        let mut bins = vec![0usize; self.neighborhood + 1];
        for slot in self.slots.iter() {
            for offset in slot.mask.offsets() {
                bins[offset] += 1;
            }
        }
        bins[self.neighborhood] = self.overflow.len();

        ProbeHistogram { bins }
    }

    /// Asserts the structural invariants linking slots, overflow list and
    /// store.
    #[cfg(test)]
    pub(crate) fn check_invariants<K, V>(&self, store: &ElementStore<K, V>) {
        use slotmap::SecondaryMap;

        let capacity = self.capacity();
        assert!(capacity >= INITIAL_CAPACITY);
        assert!(self.neighborhood <= MAX_NEIGHBORHOOD);

        let mut seen: SecondaryMap<ElementKey, ()> = SecondaryMap::new();
        for (index, slot) in self.slots.iter().enumerate() {
            for offset in slot.mask.offsets() {
                assert!(offset < self.neighborhood, "offset {offset} at {index}: {self:#?}");
                let target = &self.slots[add_index(index, offset, capacity)];
                assert!(target.mask.is_occupied(), "dangling offset at {index}: {self:#?}");
                assert_eq!(store[target.element].bucket, index, "{self:#?}");
            }

            if slot.mask.is_occupied() {
                let home = store[slot.element].bucket;
                let offset = sub_index(index, home, capacity);
                assert!(offset < self.neighborhood);
                assert!(self.slots[home].mask.has_offset(offset), "{self:#?}");
                assert!(seen.insert(slot.element, ()).is_none());
            }
        }

        for &element in &self.overflow {
            let home = store[element].bucket;
            assert!(self.slots[home].mask.has_overflow(), "{self:#?}");
            assert!(seen.insert(element, ()).is_none());
        }

        assert_eq!(seen.len(), store.len());
    }
}

/// Snapshot of table utilization.
#[cfg(any(test, feature = "stats"))]
#[cfg_attr(not(feature = "stats"), allow(dead_code))]
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    /// Number of live elements.
    pub populated: usize,
    /// Number of buckets.
    pub capacity: usize,
    /// Current neighborhood size.
    pub neighborhood: usize,
    /// Population at which the next insert grows the table.
    pub max_population: usize,
    /// Buckets currently holding an element.
    pub occupied_slots: usize,
    /// Elements living in the overflow list.
    pub overflow_entries: usize,
    /// Buckets with the overflow bit set, stale bits included.
    pub overflow_buckets: usize,
    /// `populated / capacity`.
    pub load_factor: f64,
}

#[cfg(any(test, feature = "stats"))]
impl TableStats {
    /// Pretty-print the statistics.
    #[cfg(all(feature = "std", feature = "stats"))]
    pub fn print(&self) {
        println!("=== Hopscotch Table Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor, grows past {})",
            self.populated,
            self.capacity,
            self.load_factor * 100.0,
            self.max_population
        );
        println!("Neighborhood: {}", self.neighborhood);
        println!(
            "Slot Usage: {}/{} occupied",
            self.occupied_slots, self.capacity
        );
        println!(
            "Overflow: {} entries, {} flagged buckets",
            self.overflow_entries, self.overflow_buckets
        );
    }
}

/// Count of in-table elements per distance from their ideal bucket, with
/// overflowed elements in the final bin.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    bins: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// In-table counts indexed by displacement distance.
    pub fn in_table(&self) -> &[usize] {
        &self.bins[..self.bins.len() - 1]
    }

    /// Number of overflowed elements.
    pub fn overflow(&self) -> usize {
        self.bins[self.bins.len() - 1]
    }

    /// Pretty-prints the histogram as a horizontal bar chart.
    #[cfg(all(feature = "std", feature = "stats"))]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let bar = |count: usize| "█".repeat((count * max_bar).div_ceil(max));

        println!("probe histogram ({} entries):", self.bins.iter().sum::<usize>());
        for (distance, &count) in self.in_table().iter().enumerate() {
            println!("{distance:>2} | {} ({count})", bar(count));
        }
        println!("OF | {} ({})", bar(self.overflow()), self.overflow());
    }
}
