//! Error types for the `hopscotch-map` crate

/// Errors returned by checked map access.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested key is not present in the map.
    ///
    /// Returned by [`HashMap::at`](crate::HashMap::at). The lookup never
    /// inserts, so the map is unchanged after this error.
    #[error("key not found in the hash map")]
    KeyNotFound,
}

/// Result alias for fallible map operations.
pub type Result<T> = core::result::Result<T, Error>;
