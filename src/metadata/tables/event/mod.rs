//! `Event` table (0x14).

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `EventAttributes`
pub mod EventAttributes {
    /// Name is special
    pub const SPECIAL_NAME: u32 = 0x200;
    /// Runtime should check the name encoding
    pub const RT_SPECIAL_NAME: u32 = 0x400;
}
