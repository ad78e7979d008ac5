//! `EncLog` table (0x1e).

mod raw;

pub use raw::*;
