//! `ClassLayout` table (0x0f).

mod raw;

pub use raw::*;
