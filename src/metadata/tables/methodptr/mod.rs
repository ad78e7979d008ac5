//! `MethodPtr` table (0x05).

mod raw;

pub use raw::*;
