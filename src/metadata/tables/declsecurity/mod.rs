//! `DeclSecurity` table (0x0e).

mod raw;

pub use raw::*;
