//! `EventPtr` table (0x13).

mod raw;

pub use raw::*;
