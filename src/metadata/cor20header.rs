//! The CLI header (ECMA-335 §II.25.3.3), located through data directory 14.
//!
//! A fixed 72-byte structure without a signature. Besides the runtime version it locates the
//! metadata root, the embedded managed resources and the strong name signature, and carries the
//! entry point token.

use bitflags::bitflags;

use crate::{file::parser::Parser, metadata::token::Token, Result};

/// Size of the CLI header in bytes.
pub const COR20_HEADER_SIZE: usize = 72;

bitflags! {
    /// `COMIMAGE_FLAGS_*` of the CLI header.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ComImageFlags: u32 {
        /// The image contains only CIL code
        const ILONLY = 0x0000_0001;
        /// The image can only be loaded into a 32-bit process
        const REQUIRED_32BIT = 0x0000_0002;
        /// The image has a strong name signature
        const STRONGNAMESIGNED = 0x0000_0008;
        /// The entry point is a native RVA rather than a method token
        const NATIVE_ENTRYPOINT = 0x0000_0010;
        /// The image should run in a 32-bit process where available
        const PREFERRED_32BIT = 0x0002_0000;
    }
}

/// The CLI header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cor20Header {
    /// Size of the header in bytes
    pub cb: u32,
    /// Minimum major runtime version
    pub major_runtime_version: u16,
    /// Minimum minor runtime version
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub meta_data_rva: u32,
    /// Size of the metadata
    pub meta_data_size: u32,
    /// Image flags
    pub flags: ComImageFlags,
    /// `MethodDef` or `File` token of the entry point, or a native RVA with `NATIVE_ENTRYPOINT`
    pub entry_point_token: u32,
    /// RVA of the embedded managed resources
    pub resource_rva: u32,
    /// Size of the embedded managed resources
    pub resource_size: u32,
    /// RVA of the strong name signature
    pub strong_name_signature_rva: u32,
    /// Size of the strong name signature
    pub strong_name_signature_size: u32,
    /// RVA of the vtable fixups
    pub vtable_fixups_rva: u32,
    /// Size of the vtable fixups
    pub vtable_fixups_size: u32,
    /// RVA of the managed native header, used by precompiled images
    pub managed_native_header_rva: u32,
    /// Size of the managed native header
    pub managed_native_header_size: u32,
}

impl Cor20Header {
    /// Parses the header from the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than 72 bytes are available and
    /// [`crate::Error::Malformed`] if the declared size is too small or there is no metadata.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        if data.len() < COR20_HEADER_SIZE {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(data);
        let cb = parser.read_le::<u32>()?;
        if (cb as usize) < COR20_HEADER_SIZE {
            return Err(malformed_error!("Invalid CLI header size: {}", cb));
        }

        let major_runtime_version = parser.read_le::<u16>()?;
        let minor_runtime_version = parser.read_le::<u16>()?;
        let meta_data_rva = parser.read_le::<u32>()?;
        let meta_data_size = parser.read_le::<u32>()?;
        if meta_data_rva == 0 || meta_data_size == 0 {
            return Err(malformed_error!("CLI header does not locate any metadata"));
        }

        let flags = ComImageFlags::from_bits_retain(parser.read_le::<u32>()?);
        let entry_point_token = parser.read_le::<u32>()?;
        let resource_rva = parser.read_le::<u32>()?;
        let resource_size = parser.read_le::<u32>()?;
        let strong_name_signature_rva = parser.read_le::<u32>()?;
        let strong_name_signature_size = parser.read_le::<u32>()?;
        // code manager table, reserved
        parser.advance_by(8)?;
        let vtable_fixups_rva = parser.read_le::<u32>()?;
        let vtable_fixups_size = parser.read_le::<u32>()?;
        // export address table jumps, reserved
        parser.advance_by(8)?;
        let managed_native_header_rva = parser.read_le::<u32>()?;
        let managed_native_header_size = parser.read_le::<u32>()?;

        Ok(Cor20Header {
            cb,
            major_runtime_version,
            minor_runtime_version,
            meta_data_rva,
            meta_data_size,
            flags,
            entry_point_token,
            resource_rva,
            resource_size,
            strong_name_signature_rva,
            strong_name_signature_size,
            vtable_fixups_rva,
            vtable_fixups_size,
            managed_native_header_rva,
            managed_native_header_size,
        })
    }

    /// The managed entry point, `None` for libraries and native entry points.
    #[must_use]
    pub fn entry_point(&self) -> Option<Token> {
        if self.flags.contains(ComImageFlags::NATIVE_ENTRYPOINT) || self.entry_point_token == 0 {
            return None;
        }

        Some(Token::new(self.entry_point_token))
    }
}
