//! `File` table (0x26).

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `FileAttributes`
pub mod FileAttributes {
    /// The file is a module with metadata
    pub const CONTAINS_META_DATA: u32 = 0x0;
    /// The file is a resource or other non-metadata file
    pub const CONTAINS_NO_META_DATA: u32 = 0x1;
}
