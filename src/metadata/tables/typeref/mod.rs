//! `TypeRef` table (0x01).
//!
//! Each row names a type by `(namespace, name)` and a resolution scope. Resolving a `TypeRef`
//! means locating that scope (another module, another assembly, or the enclosing type for
//! nested types) and looking the name up there.

mod raw;

pub use raw::*;
