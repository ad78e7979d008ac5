//! `EncMap` table (0x1f).

mod raw;

pub use raw::*;
