//! `TypeSpec` table (0x1b).

mod raw;

pub use raw::*;
