//! `MethodSpec` table (0x2b).

mod raw;

pub use raw::*;
