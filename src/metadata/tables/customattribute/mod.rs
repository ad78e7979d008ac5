//! `CustomAttribute` table (0x0c).

mod raw;

pub use raw::*;
