//! `AssemblyRef` table (0x23).

mod raw;

pub use raw::*;
