//! `EventMap` table (0x12).

mod raw;

pub use raw::*;
