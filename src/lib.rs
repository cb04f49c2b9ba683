#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Tuning constants and the cargo features that select them.
pub mod config;

mod element_store;

/// Errors returned by checked access.
pub mod error;

/// An insertion-ordered HashMap using hopscotch hashing.
///
/// This module provides the `HashMap` type together with its entry API and
/// iterators.
pub mod hash_map;

#[cfg(all(test, feature = "std"))]
mod hash_map_proptest;

mod hash_table;

pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
#[cfg(feature = "stats")]
pub use hash_table::ProbeHistogram;
#[cfg(feature = "stats")]
pub use hash_table::TableStats;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used when none is supplied.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hasher builder used when none is supplied.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        compile_error!("either the `foldhash` or the `std` feature must be enabled");
    }
}
