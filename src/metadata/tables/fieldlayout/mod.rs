//! `FieldLayout` table (0x10).

mod raw;

pub use raw::*;
