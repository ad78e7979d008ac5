//! `ParamPtr` table (0x07).
//!
//! Rows of this table are decoded so that the stream stays aligned, but a module that actually
//! uses the indirection is rejected with [`crate::Error::NotImplemented`] when it is loaded.

mod raw;

pub use raw::*;
