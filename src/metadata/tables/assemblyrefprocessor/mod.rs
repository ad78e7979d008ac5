//! `AssemblyRefProcessor` table (0x24).

mod raw;

pub use raw::*;
