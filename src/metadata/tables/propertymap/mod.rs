//! `PropertyMap` table (0x15).

mod raw;

pub use raw::*;
