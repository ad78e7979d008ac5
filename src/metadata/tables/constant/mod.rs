//! `Constant` table (0x0b).

mod raw;

pub use raw::*;
