//! `Property` table (0x17).

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `PropertyAttributes`
pub mod PropertyAttributes {
    /// Name is special
    pub const SPECIAL_NAME: u32 = 0x200;
    /// Runtime should check the name encoding
    pub const RT_SPECIAL_NAME: u32 = 0x400;
    /// Property has a default value
    pub const HAS_DEFAULT: u32 = 0x1000;
}
