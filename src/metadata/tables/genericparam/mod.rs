//! `GenericParam` table (0x2A).
//!
//! The table is sorted by `(owner, number)`, where `owner` is compared by its raw coded index
//! value. All parameters of one type or method therefore form one contiguous run:
//! [`MetadataTable::find_first_by_owner`] binary searches for its start and
//! [`MetadataTable::by_owner`] walks it, stopping at the first row of another owner.

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `GenericParamAttributes`
pub mod GenericParamAttributes {
    /// Mask for the variance bits
    pub const VARIANCE_MASK: u32 = 0x3;
    /// Covariant
    pub const COVARIANT: u32 = 0x1;
    /// Contravariant
    pub const CONTRAVARIANT: u32 = 0x2;
    /// Mask for the special constraint bits
    pub const SPECIAL_CONSTRAINT_MASK: u32 = 0x1c;
    /// `class` constraint
    pub const REFERENCE_TYPE_CONSTRAINT: u32 = 0x4;
    /// `struct` constraint
    pub const NOT_NULLABLE_VALUE_TYPE_CONSTRAINT: u32 = 0x8;
    /// `new()` constraint
    pub const DEFAULT_CONSTRUCTOR_CONSTRAINT: u32 = 0x10;
}
