//! The metadata root (ECMA-335 §II.24.2.1).
//!
//! ```text
//! u32 signature 'BSJB' | u16 major | u16 minor | u32 reserved | u32 length
//! u8  version[length]           (NUL padded to a multiple of 4)
//! u16 flags | u16 streams
//! stream headers
//! ```
//!
//! The signature is checked before anything else is read, so a buffer that is not metadata
//! fails here with a clear message.

use crate::{file::io::read_le_at, metadata::streams::StreamHeader, Result};

/// `BSJB`, the metadata root signature.
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The parsed metadata root with its stream directory.
#[derive(Clone, Debug)]
pub struct Root {
    /// Major version of the metadata format
    pub major_version: u16,
    /// Minor version of the metadata format
    pub minor_version: u16,
    /// Runtime version string with trailing NULs removed, e.g. `v4.0.30319`
    pub version: String,
    /// Reserved flags
    pub flags: u16,
    /// The streams, in header order
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Parses the root from the start of the metadata, validating that every stream lies within
    /// `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a wrong signature or an unknown stream name and
    /// [`crate::Error::OutOfBounds`] for truncated data or a stream past the metadata.
    pub fn read(data: &[u8]) -> Result<Root> {
        let mut offset = 0_usize;
        let signature = read_le_at::<u32>(data, &mut offset)?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "Invalid metadata root signature - {:#010x}",
                signature
            ));
        }

        let major_version = read_le_at::<u16>(data, &mut offset)?;
        let minor_version = read_le_at::<u16>(data, &mut offset)?;
        offset += 4;
        let length = read_le_at::<u32>(data, &mut offset)? as usize;

        let Some(raw_version) = offset
            .checked_add(length)
            .and_then(|end| data.get(offset..end))
        else {
            return Err(out_of_bounds_error!());
        };
        let version = String::from_utf8_lossy(raw_version)
            .trim_end_matches('\0')
            .to_string();
        offset += (length + 3) & !3;

        let flags = read_le_at::<u16>(data, &mut offset)?;
        let stream_count = read_le_at::<u16>(data, &mut offset)?;

        let mut stream_headers = Vec::with_capacity(usize::from(stream_count));
        for _ in 0..stream_count {
            let header = StreamHeader::read(data, &mut offset)?;
            let end = u64::from(header.offset) + u64::from(header.size);
            if end > data.len() as u64 {
                return Err(out_of_bounds_error!());
            }
            stream_headers.push(header);
        }

        tracing::debug!(
            version = version.as_str(),
            streams = stream_headers.len(),
            "parsed metadata root"
        );

        Ok(Root {
            major_version,
            minor_version,
            version,
            flags,
            stream_headers,
        })
    }

    /// The bytes of the stream named `name` within `data`, if present.
    #[must_use]
    pub fn stream_data<'a>(&self, data: &'a [u8], name: &str) -> Option<&'a [u8]> {
        self.stream_headers
            .iter()
            .find(|header| header.name == name)
            .and_then(|header| {
                data.get(header.offset as usize..(header.offset + header.size) as usize)
            })
    }

    /// The table stream, either compressed (`#~`) or uncompressed (`#-`).
    #[must_use]
    pub fn tables_stream<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        self.stream_data(data, "#~")
            .or_else(|| self.stream_data(data, "#-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn root_bytes() -> Vec<u8> {
        #[rustfmt::skip]
        let data = vec![
            0x42, 0x53, 0x4A, 0x42, // signature
            0x01, 0x00, 0x01, 0x00, // version 1.1
            0x00, 0x00, 0x00, 0x00, // reserved
            0x0C, 0x00, 0x00, 0x00, // length
            b'v', b'4', b'.', b'0', b'.', b'3', b'0', b'3', b'1', b'9', 0x00, 0x00,
            0x00, 0x00, // flags
            0x02, 0x00, // streams
            0x38, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, b'#', b'~', 0x00, 0x00,
            0x3C, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, b'#', b'U', b'S', 0x00,
            0x01, 0x02, 0x03, 0x04,
            0x00, 0x05, 0x06, 0x07,
        ];
        data
    }

    #[test]
    fn crafted() {
        let data = root_bytes();
        let root = Root::read(&data).unwrap();
        assert_eq!(root.version, "v4.0.30319");
        assert_eq!(root.stream_headers.len(), 2);
        assert_eq!(root.tables_stream(&data).unwrap(), &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(root.stream_data(&data, "#US").unwrap(), &[0x00, 0x05, 0x06, 0x07]);
        assert!(root.stream_data(&data, "#Blob").is_none());
    }

    #[test]
    fn bad_signature() {
        let mut data = root_bytes();
        data[0] = 0x43;
        assert!(matches!(Root::read(&data), Err(Error::Malformed { .. })));
        assert!(matches!(Root::read(&[]), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn stream_outside_metadata() {
        let mut data = root_bytes();
        data[36] = 0xF0;
        assert!(matches!(Root::read(&data), Err(Error::OutOfBounds { .. })));
    }
}
