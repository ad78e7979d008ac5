//! `StandAloneSig` table (0x11).

mod raw;

pub use raw::*;
