//! `Module` table (0x00).
//!
//! Holds exactly one row describing the module the table stream belongs to: its file name and the
//! module version id (MVID) GUID. Row 1 is what `Module` resolution scopes point at.

mod raw;

pub use raw::*;
