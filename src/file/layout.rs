//! PE/COFF image layout: headers, data directories and the section table.
//!
//! [`ImageLayout`] is an owned snapshot of the parts of the PE headers that a metadata reader
//! needs. Header decoding is delegated to `goblin`; the MS-DOS signature is checked up front so
//! that a non-image fails at the earliest structural check with a clear message.
//!
//! The central service is [`ImageLayout::rva_to_file_offset`], which maps a relative virtual
//! address onto the file through the first section whose `[VirtualAddress,
//! VirtualAddress + VirtualSize)` window contains it.
//!
//! ```rust
//! use cilreader::{ImageLayout, SectionInfo};
//!
//! let layout = ImageLayout::from_sections(vec![SectionInfo {
//!     name: ".text".to_string(),
//!     virtual_address: 0x2000,
//!     virtual_size: 0x1000,
//!     pointer_to_raw_data: 0x200,
//!     size_of_raw_data: 0x1000,
//!     characteristics: 0x6000_0020,
//! }]);
//! assert_eq!(layout.rva_to_file_offset(0x2010)?, 0x210);
//! assert!(layout.rva_to_file_offset(0x3000).is_err());
//! # Ok::<(), cilreader::Error>(())
//! ```

use goblin::pe::header::Header;

use crate::Result;

const DOS_MAGIC: u16 = 0x5A4D;
const PE_MAGIC_SIZE: usize = 4;
const COFF_HEADER_SIZE: usize = 20;
const OPTIONAL_HEADER_MAGIC_PE32_PLUS: u16 = 0x20B;

/// Number of entries in the optional header's data directory table.
pub const DATA_DIRECTORY_COUNT: usize = 16;
/// Index of the resource directory.
pub const DIRECTORY_RESOURCE: usize = 2;
/// Index of the CLI (COR20) header directory.
pub const DIRECTORY_CLI_HEADER: usize = 14;

/// One entry of the PE section table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionInfo {
    /// Section name with trailing NULs removed
    pub name: String,
    /// RVA of the first byte of the section
    pub virtual_address: u32,
    /// Size of the section once mapped
    pub virtual_size: u32,
    /// File offset of the section's raw data
    pub pointer_to_raw_data: u32,
    /// Size of the raw data in the file
    pub size_of_raw_data: u32,
    /// `IMAGE_SCN_*` flags
    pub characteristics: u32,
}

impl SectionInfo {
    /// Returns `true` if `rva` lies inside this section's virtual window.
    #[must_use]
    pub fn contains_rva(&self, rva: u32) -> bool {
        rva >= self.virtual_address
            && u64::from(rva) < u64::from(self.virtual_address) + u64::from(self.virtual_size)
    }
}

/// An `(rva, size)` data directory entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataDirectoryEntry {
    /// RVA of the directory contents
    pub virtual_address: u32,
    /// Size of the directory contents in bytes
    pub size: u32,
}

/// Owned view of a PE image's headers and section table.
#[derive(Clone, Debug, Default)]
pub struct ImageLayout {
    /// `IMAGE_FILE_HEADER.Machine`
    pub machine: u16,
    /// `IMAGE_FILE_HEADER.Characteristics`
    pub characteristics: u16,
    /// `true` for a PE32+ (64-bit) optional header
    pub is_pe32_plus: bool,
    /// Preferred load address
    pub image_base: u64,
    /// `IMAGE_SUBSYSTEM_*` value
    pub subsystem: u16,
    /// Alignment of sections once mapped
    pub section_alignment: u32,
    /// Alignment of raw section data in the file
    pub file_alignment: u32,
    directories: [DataDirectoryEntry; DATA_DIRECTORY_COUNT],
    sections: Vec<SectionInfo>,
}

impl ImageLayout {
    /// Parses the MS-DOS stub, PE signature, file header, optional header and section table.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty buffer, [`crate::Error::Malformed`] if the
    /// `MZ` signature is missing or there is no optional header, and
    /// [`crate::Error::GoblinErr`] for any other header defect.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }

        if data.len() < 2 || u16::from_le_bytes([data[0], data[1]]) != DOS_MAGIC {
            return Err(malformed_error!("Invalid MS-DOS signature"));
        }

        let header = Header::parse(data)?;
        let Some(optional) = header.optional_header else {
            return Err(malformed_error!("Image does not have an optional header"));
        };

        let mut directories = [DataDirectoryEntry::default(); DATA_DIRECTORY_COUNT];
        for (dir_type, directory) in optional.data_directories.dirs() {
            let index = dir_type as usize;
            if index < DATA_DIRECTORY_COUNT {
                directories[index] = DataDirectoryEntry {
                    virtual_address: directory.virtual_address,
                    size: directory.size,
                };
            }
        }

        let mut offset = header.dos_header.pe_pointer as usize
            + PE_MAGIC_SIZE
            + COFF_HEADER_SIZE
            + usize::from(header.coff_header.size_of_optional_header);
        let sections = header
            .coff_header
            .sections(data, &mut offset)?
            .iter()
            .map(|section| SectionInfo {
                name: String::from_utf8_lossy(&section.name)
                    .trim_end_matches('\0')
                    .to_string(),
                virtual_address: section.virtual_address,
                virtual_size: section.virtual_size,
                pointer_to_raw_data: section.pointer_to_raw_data,
                size_of_raw_data: section.size_of_raw_data,
                characteristics: section.characteristics,
            })
            .collect::<Vec<_>>();

        let layout = ImageLayout {
            machine: header.coff_header.machine,
            characteristics: header.coff_header.characteristics,
            is_pe32_plus: optional.standard_fields.magic == OPTIONAL_HEADER_MAGIC_PE32_PLUS,
            image_base: optional.windows_fields.image_base,
            subsystem: optional.windows_fields.subsystem,
            section_alignment: optional.windows_fields.section_alignment,
            file_alignment: optional.windows_fields.file_alignment,
            directories,
            sections,
        };

        tracing::debug!(
            machine = layout.machine,
            sections = layout.sections.len(),
            pe32_plus = layout.is_pe32_plus,
            "parsed PE layout"
        );

        Ok(layout)
    }

    /// Builds a layout from a known section table, with empty headers and directories.
    #[must_use]
    pub fn from_sections(sections: Vec<SectionInfo>) -> Self {
        ImageLayout {
            sections,
            ..ImageLayout::default()
        }
    }

    /// Translates a relative virtual address into a file offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if no section contains `rva`.
    pub fn rva_to_file_offset(&self, rva: u32) -> Result<u64> {
        let section = self
            .section_for_rva(rva)
            .ok_or_else(|| malformed_error!("RVA {:#x} is not mapped by any section", rva))?;

        Ok(u64::from(section.pointer_to_raw_data) + u64::from(rva - section.virtual_address))
    }

    /// Returns the first section whose virtual window contains `rva`.
    #[must_use]
    pub fn section_for_rva(&self, rva: u32) -> Option<&SectionInfo> {
        self.sections.iter().find(|section| section.contains_rva(rva))
    }

    /// Returns the `(rva, size)` pair of a data directory, `None` for an empty or absent entry.
    #[must_use]
    pub fn get_data_directory(&self, index: usize) -> Option<(u32, u32)> {
        self.directories
            .get(index)
            .filter(|entry| entry.virtual_address != 0 && entry.size != 0)
            .map(|entry| (entry.virtual_address, entry.size))
    }

    /// All data directory entries, including empty ones.
    #[must_use]
    pub fn data_directories(&self) -> &[DataDirectoryEntry] {
        &self.directories
    }

    /// The section table in file order.
    #[must_use]
    pub fn sections(&self) -> &[SectionInfo] {
        &self.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::builder::ImageBuilder, Error};

    fn section(va: u32, vsize: u32, raw: u32) -> SectionInfo {
        SectionInfo {
            name: ".s".to_string(),
            virtual_address: va,
            virtual_size: vsize,
            pointer_to_raw_data: raw,
            size_of_raw_data: vsize,
            characteristics: 0,
        }
    }

    #[test]
    fn rva_mapping() {
        let layout = ImageLayout::from_sections(vec![
            section(0x1000, 0x800, 0x400),
            section(0x2000, 0x1000, 0x0C00),
            section(0x4000, 0x10, 0x1C00),
        ]);

        assert_eq!(layout.rva_to_file_offset(0x1000).unwrap(), 0x400);
        assert_eq!(layout.rva_to_file_offset(0x17FF).unwrap(), 0xBFF);
        assert_eq!(layout.rva_to_file_offset(0x2345).unwrap(), 0x0F45);
        assert_eq!(layout.rva_to_file_offset(0x400F).unwrap(), 0x1C0F);
        assert_eq!(layout.section_for_rva(0x2000).unwrap().virtual_address, 0x2000);
    }

    #[test]
    fn rva_outside_sections() {
        let layout = ImageLayout::from_sections(vec![
            section(0x1000, 0x800, 0x400),
            section(0x2000, 0x1000, 0x0C00),
        ]);

        for rva in [0, 0x0FFF, 0x1800, 0x1FFF, 0x3000, u32::MAX] {
            assert!(
                matches!(layout.rva_to_file_offset(rva), Err(Error::Malformed { .. })),
                "rva {rva:#x}"
            );
        }
    }

    #[test]
    fn first_matching_section_wins() {
        let layout = ImageLayout::from_sections(vec![
            section(0x1000, 0x1000, 0x200),
            section(0x1800, 0x1000, 0x5000),
        ]);
        assert_eq!(layout.rva_to_file_offset(0x1900).unwrap(), 0xB00);
    }

    #[test]
    fn parse_synthetic_image() {
        let image = ImageBuilder::new().build_image();
        let layout = ImageLayout::parse(&image).unwrap();

        assert_eq!(layout.machine, 0x14C);
        assert!(!layout.is_pe32_plus);
        assert_eq!(layout.sections().len(), 1);
        assert_eq!(layout.sections()[0].name, ".text");
        assert_eq!(layout.file_alignment, 0x200);

        let (cli_rva, cli_size) = layout.get_data_directory(DIRECTORY_CLI_HEADER).unwrap();
        assert_eq!(cli_size, 72);
        assert_eq!(layout.rva_to_file_offset(cli_rva).unwrap(), 0x200);
        assert!(layout.get_data_directory(DIRECTORY_RESOURCE).is_none());
        assert!(layout.get_data_directory(99).is_none());
    }

    #[test]
    fn bad_dos_signature() {
        let mut image = ImageBuilder::new().build_image();
        image[0] = b'Z';
        image[1] = b'M';
        assert!(matches!(ImageLayout::parse(&image), Err(Error::Malformed { .. })));

        assert!(matches!(ImageLayout::parse(&[]), Err(Error::Empty)));
        assert!(matches!(ImageLayout::parse(&[0x4D]), Err(Error::Malformed { .. })));
    }

    #[test]
    fn bad_pe_signature() {
        let mut image = ImageBuilder::new().build_image();
        image[0x80] = b'X';
        assert!(ImageLayout::parse(&image).unwrap_err().is_bad_image_format());
    }
}
