//! `Assembly` table (0x20).
//!
//! Present with a single row in the manifest module of an assembly, absent from satellite
//! modules. A module that carries this row becomes the manifest module of its own assembly when
//! it is loaded standalone.

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `AssemblyFlags`
pub mod AssemblyFlags {
    /// The public key column holds the full key rather than a token
    pub const PUBLIC_KEY: u32 = 0x1;
    /// The implementation may be retargeted at runtime
    pub const RETARGETABLE: u32 = 0x100;
    /// JIT optimizations are disabled
    pub const DISABLE_JIT_COMPILE_OPTIMIZER: u32 = 0x4000;
    /// JIT tracking is enabled
    pub const ENABLE_JIT_COMPILE_TRACKING: u32 = 0x8000;
}

#[allow(non_snake_case)]
/// All possible values for `AssemblyHashAlgorithm`
pub mod AssemblyHashAlgorithm {
    /// No hash
    pub const NONE: u32 = 0x0;
    /// MD5
    pub const MD5: u32 = 0x8003;
    /// SHA-1
    pub const SHA1: u32 = 0x8004;
}
