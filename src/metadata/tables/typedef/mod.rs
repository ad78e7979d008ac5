//! `TypeDef` table (0x02).
//!
//! One row per type defined in the module. Fields and methods are not linked from the child
//! side: a type owns the run of `Field` rows starting at its `field_list` and ending where the
//! next type's run begins (likewise for `MethodDef`). Row 1 is the `<Module>` pseudo-type that
//! holds global fields and methods.

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `TypeAttributes`
pub mod TypeAttributes {
    /// Mask for the visibility bits
    pub const VISIBILITY_MASK: u32 = 0x7;
    /// Not visible outside the assembly
    pub const NOT_PUBLIC: u32 = 0x0;
    /// Visible outside the assembly
    pub const PUBLIC: u32 = 0x1;
    /// Nested, public
    pub const NESTED_PUBLIC: u32 = 0x2;
    /// Nested, private
    pub const NESTED_PRIVATE: u32 = 0x3;
    /// Nested, family
    pub const NESTED_FAMILY: u32 = 0x4;
    /// Nested, assembly
    pub const NESTED_ASSEMBLY: u32 = 0x5;
    /// Nested, family and assembly
    pub const NESTED_FAM_AND_ASSEM: u32 = 0x6;
    /// Nested, family or assembly
    pub const NESTED_FAM_OR_ASSEM: u32 = 0x7;
    /// Mask for the layout bits
    pub const LAYOUT_MASK: u32 = 0x18;
    /// Fields are laid out automatically
    pub const AUTO_LAYOUT: u32 = 0x0;
    /// Fields are laid out sequentially
    pub const SEQUENTIAL_LAYOUT: u32 = 0x8;
    /// Field offsets are given explicitly
    pub const EXPLICIT_LAYOUT: u32 = 0x10;
    /// Type is an interface
    pub const INTERFACE: u32 = 0x20;
    /// Type is abstract
    pub const ABSTRACT: u32 = 0x80;
    /// Type cannot be derived from
    pub const SEALED: u32 = 0x100;
    /// Name is special
    pub const SPECIAL_NAME: u32 = 0x400;
    /// Runtime should check the name encoding
    pub const RT_SPECIAL_NAME: u32 = 0x800;
    /// Type is imported
    pub const IMPORT: u32 = 0x1000;
    /// Type is serializable
    pub const SERIALIZABLE: u32 = 0x2000;
    /// Mask for the string interop format
    pub const STRING_FORMAT_MASK: u32 = 0x30000;
    /// Type has security attributes
    pub const HAS_SECURITY: u32 = 0x40000;
    /// Type initializer may run before the first static field access
    pub const BEFORE_FIELD_INIT: u32 = 0x100000;
    /// `ExportedType` flag: the type is forwarded to another assembly
    pub const IS_TYPE_FORWARDER: u32 = 0x200000;
}
