//! Stream headers of the metadata root (ECMA-335 §II.24.2.2).

use crate::{file::io::read_le_at, Result};

const MAX_NAME_LENGTH: usize = 32;

/// Names of the streams this reader understands.
pub const KNOWN_STREAMS: [&str; 6] = ["#Strings", "#US", "#Blob", "#GUID", "#~", "#-"];

/// Location and name of one metadata stream.
///
/// The header has no fixed size: the NUL-terminated name is padded to a 4-byte boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    /// Offset of the stream relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Stream name without the terminator
    pub name: String,
}

impl StreamHeader {
    /// Parses one header at `*offset` and advances past its padding.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated data and [`crate::Error::Malformed`]
    /// for an unterminated or unknown name.
    pub fn read(data: &[u8], offset: &mut usize) -> Result<StreamHeader> {
        let stream_offset = read_le_at::<u32>(data, offset)?;
        let size = read_le_at::<u32>(data, offset)?;

        let Some(tail) = data.get(*offset..) else {
            return Err(out_of_bounds_error!());
        };
        let window = &tail[..tail.len().min(MAX_NAME_LENGTH)];
        let Some(length) = window.iter().position(|byte| *byte == 0) else {
            return Err(malformed_error!("Stream name at offset {} is not terminated", *offset));
        };

        let name = String::from_utf8_lossy(&window[..length]).into_owned();
        if !KNOWN_STREAMS.contains(&name.as_str()) {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        // name plus terminator, rounded up to 4
        *offset += (length + 4) & !3;

        Ok(StreamHeader {
            offset: stream_offset,
            size,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn padded_names() {
        #[rustfmt::skip]
        let data = [
            0x6C, 0x00, 0x00, 0x00, 0xA4, 0x45, 0x00, 0x00, b'#', b'~', 0x00, 0x00,
            0x10, 0x46, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00,
            b'#', b'S', b't', b'r', b'i', b'n', b'g', b's', 0x00, 0x00, 0x00, 0x00,
            0x30, 0x46, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, b'#', b'U', b'S', 0x00,
        ];

        let mut offset = 0;
        let tables = StreamHeader::read(&data, &mut offset).unwrap();
        assert_eq!((tables.offset, tables.size, tables.name.as_str()), (0x6C, 0x45A4, "#~"));
        assert_eq!(offset, 12);

        let strings = StreamHeader::read(&data, &mut offset).unwrap();
        assert_eq!(strings.name, "#Strings");
        assert_eq!(offset, 32);

        let us = StreamHeader::read(&data, &mut offset).unwrap();
        assert_eq!(us.name, "#US");
        assert_eq!(offset, data.len());
    }

    #[test]
    fn unknown_or_broken() {
        let data = [0x6C, 0x00, 0x00, 0x00, 0xA4, 0x45, 0x00, 0x00, b'$', b'~', 0x00, 0x00];
        assert!(matches!(
            StreamHeader::read(&data, &mut 0),
            Err(Error::Malformed { .. })
        ));

        let data = [0x6C, 0x00, 0x00, 0x00, 0xA4, 0x45, 0x00, 0x00, b'#', b'~'];
        assert!(StreamHeader::read(&data, &mut 0).is_err());

        let data = [0x6C, 0x00, 0x00, 0x00];
        assert!(matches!(
            StreamHeader::read(&data, &mut 0),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
