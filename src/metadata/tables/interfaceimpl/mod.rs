//! `InterfaceImpl` table (0x09).

mod raw;

pub use raw::*;
