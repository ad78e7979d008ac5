//! `MethodDef` table (0x06).

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `MethodAttributes`
pub mod MethodAttributes {
    /// Mask for the accessibility bits
    pub const MEMBER_ACCESS_MASK: u32 = 0x7;
    /// Member not referenceable
    pub const COMPILER_CONTROLLED: u32 = 0x0;
    /// Accessible only by the parent type
    pub const PRIVATE: u32 = 0x1;
    /// Accessible by sub-types only in this assembly
    pub const FAM_AND_ASSEM: u32 = 0x2;
    /// Accessible by anyone in the assembly
    pub const ASSEM: u32 = 0x3;
    /// Accessible only by type and sub-types
    pub const FAMILY: u32 = 0x4;
    /// Accessible by sub-types anywhere, plus anyone in the assembly
    pub const FAM_OR_ASSEM: u32 = 0x5;
    /// Accessible by anyone
    pub const PUBLIC: u32 = 0x6;
    /// Managed method exported to unmanaged code
    pub const UNMANAGED_EXPORT: u32 = 0x8;
    /// Defined on the type, not per instance
    pub const STATIC: u32 = 0x10;
    /// Cannot be overridden
    pub const FINAL: u32 = 0x20;
    /// Virtual method
    pub const VIRTUAL: u32 = 0x40;
    /// Hides by name and signature
    pub const HIDE_BY_SIG: u32 = 0x80;
    /// Always gets a new vtable slot
    pub const NEW_SLOT: u32 = 0x100;
    /// Can only be overridden if also accessible
    pub const STRICT: u32 = 0x200;
    /// No implementation
    pub const ABSTRACT: u32 = 0x400;
    /// Name is special
    pub const SPECIAL_NAME: u32 = 0x800;
    /// Runtime should check the name encoding
    pub const RT_SPECIAL_NAME: u32 = 0x1000;
    /// Implementation is forwarded through PInvoke
    pub const PINVOKE_IMPL: u32 = 0x2000;
    /// Method has security attributes
    pub const HAS_SECURITY: u32 = 0x4000;
    /// Method calls another method containing security code
    pub const REQUIRE_SEC_OBJECT: u32 = 0x8000;
}

#[allow(non_snake_case)]
/// All possible flags for `MethodImplAttributes`
pub mod MethodImplAttributes {
    /// Mask for the code type bits
    pub const CODE_TYPE_MASK: u32 = 0x3;
    /// Method body is CIL
    pub const IL: u32 = 0x0;
    /// Method body is native code
    pub const NATIVE: u32 = 0x1;
    /// Reserved
    pub const OPTIL: u32 = 0x2;
    /// Implementation is provided by the runtime
    pub const RUNTIME: u32 = 0x3;
    /// Method body is unmanaged
    pub const UNMANAGED: u32 = 0x4;
    /// Method may not be inlined
    pub const NO_INLINING: u32 = 0x8;
    /// Method is defined, the body is provided elsewhere
    pub const FORWARD_REF: u32 = 0x10;
    /// Method is single threaded through the body
    pub const SYNCHRONIZED: u32 = 0x20;
    /// Method may not be optimized
    pub const NO_OPTIMIZATION: u32 = 0x40;
    /// Signature is exported exactly as declared
    pub const PRESERVE_SIG: u32 = 0x80;
    /// Method should be inlined if possible
    pub const AGGRESSIVE_INLINING: u32 = 0x100;
    /// Implemented by the runtime itself
    pub const INTERNAL_CALL: u32 = 0x1000;
}
