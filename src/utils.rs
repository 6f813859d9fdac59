//! Type aliases for operations that support partial success.
//! Some parts of such an operation may fail softly while the rest completes,
//! and the caller still learns which parts were skipped.

/// Represents a successful operation where some parts failed but didn't prevent overall success.
/// The `Vec<E>` contains the parts that were skipped and why.
pub type PartialSuccess<T, E> = ( T, Vec<E> );
