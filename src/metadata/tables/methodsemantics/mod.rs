//! `MethodSemantics` table (0x18).

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `MethodSemanticsAttributes`
pub mod MethodSemanticsAttributes {
    /// Property setter
    pub const SETTER: u32 = 0x1;
    /// Property getter
    pub const GETTER: u32 = 0x2;
    /// Other accessor of a property or event
    pub const OTHER: u32 = 0x4;
    /// Event add accessor
    pub const ADD_ON: u32 = 0x8;
    /// Event remove accessor
    pub const REMOVE_ON: u32 = 0x10;
    /// Event raise accessor
    pub const FIRE: u32 = 0x20;
}
