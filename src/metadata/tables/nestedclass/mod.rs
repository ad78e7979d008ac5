//! `NestedClass` table (0x29).

mod raw;

pub use raw::*;
