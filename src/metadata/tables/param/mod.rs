//! `Param` table (0x08).

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `ParamAttributes`
pub mod ParamAttributes {
    /// Input parameter
    pub const IN: u32 = 0x1;
    /// Output parameter
    pub const OUT: u32 = 0x2;
    /// Optional parameter
    pub const OPTIONAL: u32 = 0x10;
    /// Parameter has a default value
    pub const HAS_DEFAULT: u32 = 0x1000;
    /// Parameter has marshalling information
    pub const HAS_FIELD_MARSHAL: u32 = 0x2000;
}
