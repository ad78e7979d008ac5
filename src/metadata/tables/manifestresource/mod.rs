//! `ManifestResource` table (0x28).

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `ManifestResourceAttributes`
pub mod ManifestResourceAttributes {
    /// Mask for the visibility bits
    pub const VISIBILITY_MASK: u32 = 0x7;
    /// Exported from the assembly
    pub const PUBLIC: u32 = 0x1;
    /// Private to the assembly
    pub const PRIVATE: u32 = 0x2;
}
