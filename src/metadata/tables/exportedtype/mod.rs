//! `ExportedType` table (0x27).
//!
//! Only present in manifest modules. The `implementation` column distinguishes the three cases:
//! a `File` row for types living in another module of this assembly, an `AssemblyRef` for type
//! forwarders, and another `ExportedType` row for nested exports. Chains through nested exports
//! are followed with a depth limit.

mod raw;

pub use raw::*;
