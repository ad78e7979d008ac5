//! `FieldMarshal` table (0x0d).

mod raw;

pub use raw::*;
