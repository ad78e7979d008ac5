//! `FieldRVA` table (0x1d).

mod raw;

pub use raw::*;
