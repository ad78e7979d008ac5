//! `AssemblyProcessor` table (0x21).

mod raw;

pub use raw::*;
