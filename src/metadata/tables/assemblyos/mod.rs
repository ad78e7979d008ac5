//! `AssemblyOS` table (0x22).

mod raw;

pub use raw::*;
