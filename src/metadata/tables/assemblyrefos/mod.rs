//! `AssemblyRefOS` table (0x25).

mod raw;

pub use raw::*;
