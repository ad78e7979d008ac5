//! `MethodImpl` table (0x19).

mod raw;

pub use raw::*;
