//! `MemberRef` table (0x0A).
//!
//! A member reference names its target by owner, name, and signature. Whether it refers to a
//! field or a method is not stored anywhere else than in the first byte of the signature blob:
//! `0x06` marks a field signature, anything else is a calling convention.

mod raw;

pub use raw::*;
