//! Lock helpers.
//!
//! Poisoned locks surface as [`crate::Error::LockError`] through `?` instead of panicking, so
//! the macro may only be used inside functions returning [`crate::Result`].

/// Acquires a read guard on an `RwLock`, propagating poisoning as `Error::LockError`.
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().map_err(|_| crate::Error::LockError)?
    };
}
