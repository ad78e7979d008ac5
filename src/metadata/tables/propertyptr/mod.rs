//! `PropertyPtr` table (0x16).

mod raw;

pub use raw::*;
