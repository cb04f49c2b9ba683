//! Tuning constants for the hopscotch table.
//!
//! The neighborhood bound and the load factor can be selected at compile time
//! through cargo features, mirroring how the table is usually tuned: a wider
//! neighborhood or a lower density trades memory for fewer overflow entries.

use cfg_if::cfg_if;

/// Number of buckets in a freshly constructed map.
pub const INITIAL_CAPACITY: usize = 3;

/// Neighborhood size of a freshly constructed map.
pub const INITIAL_NEIGHBORHOOD: usize = 2;

/// Factor applied to both the bucket count and the neighborhood size on
/// growth.
pub const GROWTH_FACTOR: usize = 2;

/// XOR mask folded into the external hash before bucket selection.
///
/// Any non-trivial mask works as long as it is applied consistently. It
/// breaks up hashers that map small integers to themselves.
pub const HASH_MIX: u64 = 17_969_228;

/// Odd prime multiplier spreading the mixed hash before the modulo reduction.
pub const PRIME_MULTIPLIER: u64 = 1_791_791_791;

cfg_if! {
    if #[cfg(feature = "hop-sixteen")] {
        /// Upper bound on the neighborhood size.
        pub const MAX_NEIGHBORHOOD: usize = 16;
    } else {
        /// Upper bound on the neighborhood size.
        pub const MAX_NEIGHBORHOOD: usize = 27;
    }
}

cfg_if! {
    if #[cfg(feature = "density-seventy-five")] {
        const LOAD_FACTOR_PERCENT: usize = 75;
    } else {
        const LOAD_FACTOR_PERCENT: usize = 87;
    }
}

/// Maximum ratio of live elements to buckets before the table grows.
pub const MAX_LOAD_FACTOR: f64 = LOAD_FACTOR_PERCENT as f64 / 100.0;

// Offset bits plus the overflow and occupied flags share one u32.
const _: () = assert!(MAX_NEIGHBORHOOD + 2 <= u32::BITS as usize);
const _: () = assert!(INITIAL_NEIGHBORHOOD < INITIAL_CAPACITY);
const _: () = assert!(PRIME_MULTIPLIER % 2 == 1);

/// Largest population a table of `capacity` buckets may hold.
#[inline(always)]
pub fn max_population(capacity: usize) -> usize {
    ((capacity as u128 * LOAD_FACTOR_PERCENT as u128) / 100) as usize
}

/// Grows `(capacity, neighborhood)` by [`GROWTH_FACTOR`] until `population`
/// elements fit under the load factor.
///
/// Returns the inputs unchanged when they already fit.
pub(crate) fn dimensions_for(
    population: usize,
    mut capacity: usize,
    mut neighborhood: usize,
) -> (usize, usize) {
    while max_population(capacity) < population {
        capacity = capacity
            .checked_mul(GROWTH_FACTOR)
            .expect("capacity overflow");
        neighborhood = (neighborhood * GROWTH_FACTOR).min(MAX_NEIGHBORHOOD);
    }
    (capacity, neighborhood)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_dimensions_fit_nothing_extra() {
        assert_eq!(
            dimensions_for(0, INITIAL_CAPACITY, INITIAL_NEIGHBORHOOD),
            (INITIAL_CAPACITY, INITIAL_NEIGHBORHOOD)
        );
        assert_eq!(
            dimensions_for(
                max_population(INITIAL_CAPACITY),
                INITIAL_CAPACITY,
                INITIAL_NEIGHBORHOOD
            ),
            (INITIAL_CAPACITY, INITIAL_NEIGHBORHOOD)
        );
    }

    #[test]
    fn growth_doubles_and_caps_neighborhood() {
        let (capacity, neighborhood) = dimensions_for(
            max_population(INITIAL_CAPACITY) + 1,
            INITIAL_CAPACITY,
            INITIAL_NEIGHBORHOOD,
        );
        assert_eq!(capacity, INITIAL_CAPACITY * GROWTH_FACTOR);
        assert_eq!(neighborhood, INITIAL_NEIGHBORHOOD * GROWTH_FACTOR);

        let (capacity, neighborhood) =
            dimensions_for(1_000_000, INITIAL_CAPACITY, INITIAL_NEIGHBORHOOD);
        assert!(max_population(capacity) >= 1_000_000);
        assert_eq!(neighborhood, MAX_NEIGHBORHOOD);
    }

    #[test]
    fn max_population_matches_load_factor() {
        for capacity in [3usize, 6, 12, 24, 48, 96, 1 << 20] {
            let limit = max_population(capacity);
            assert!(limit as f64 <= capacity as f64 * MAX_LOAD_FACTOR);
            assert!((limit + 1) as f64 > capacity as f64 * MAX_LOAD_FACTOR);
        }
    }
}
