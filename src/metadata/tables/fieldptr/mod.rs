//! `FieldPtr` table (0x03).

mod raw;

pub use raw::*;
