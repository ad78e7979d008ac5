//! `ImplMap` table (0x1c).

mod raw;

pub use raw::*;

#[allow(non_snake_case)]
/// All possible flags for `PInvokeAttributes`
pub mod PInvokeAttributes {
    /// Use the member name as specified
    pub const NO_MANGLE: u32 = 0x1;
    /// Mask for the character set bits
    pub const CHAR_SET_MASK: u32 = 0x6;
    /// Character set not specified
    pub const CHAR_SET_NOT_SPEC: u32 = 0x0;
    /// Marshal strings as ANSI
    pub const CHAR_SET_ANSI: u32 = 0x2;
    /// Marshal strings as Unicode
    pub const CHAR_SET_UNICODE: u32 = 0x4;
    /// Platform chooses the character set
    pub const CHAR_SET_AUTO: u32 = 0x6;
    /// Preserve the last native error
    pub const SUPPORTS_LAST_ERROR: u32 = 0x40;
    /// Mask for the calling convention bits
    pub const CALL_CONV_MASK: u32 = 0x700;
    /// Platform default calling convention
    pub const CALL_CONV_PLATFORMAPI: u32 = 0x100;
    /// cdecl
    pub const CALL_CONV_CDECL: u32 = 0x200;
    /// stdcall
    pub const CALL_CONV_STDCALL: u32 = 0x300;
    /// thiscall
    pub const CALL_CONV_THISCALL: u32 = 0x400;
    /// fastcall
    pub const CALL_CONV_FASTCALL: u32 = 0x500;
}
