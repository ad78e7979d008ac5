//! `ModuleRef` table (0x1a).

mod raw;

pub use raw::*;
