//! `Field` table (0x04).

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `FieldAttributes`
pub mod FieldAttributes {
    /// Mask for the accessibility bits
    pub const FIELD_ACCESS_MASK: u32 = 0x7;
    /// Member not referenceable
    pub const COMPILER_CONTROLLED: u32 = 0x0;
    /// Accessible only by the parent type
    pub const PRIVATE: u32 = 0x1;
    /// Accessible by sub-types only in this assembly
    pub const FAM_AND_ASSEM: u32 = 0x2;
    /// Accessible by anyone in the assembly
    pub const ASSEMBLY: u32 = 0x3;
    /// Accessible only by type and sub-types
    pub const FAMILY: u32 = 0x4;
    /// Accessible by sub-types anywhere, plus anyone in the assembly
    pub const FAM_OR_ASSEM: u32 = 0x5;
    /// Accessible by anyone
    pub const PUBLIC: u32 = 0x6;
    /// Defined on the type, not per instance
    pub const STATIC: u32 = 0x10;
    /// Can only be initialized
    pub const INIT_ONLY: u32 = 0x20;
    /// Value is a compile time constant
    pub const LITERAL: u32 = 0x40;
    /// Not serialized when the type is remoted
    pub const NOT_SERIALIZED: u32 = 0x80;
    /// Field has an RVA
    pub const HAS_FIELD_RVA: u32 = 0x100;
    /// Name is special
    pub const SPECIAL_NAME: u32 = 0x200;
    /// Runtime should check the name encoding
    pub const RT_SPECIAL_NAME: u32 = 0x400;
    /// Field has marshalling information
    pub const HAS_FIELD_MARSHAL: u32 = 0x1000;
    /// Implementation is forwarded through PInvoke
    pub const PINVOKE_IMPL: u32 = 0x2000;
    /// Field has a default value
    pub const HAS_DEFAULT: u32 = 0x8000;
}
