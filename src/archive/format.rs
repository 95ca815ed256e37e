use crate::error::{FoldpackError, Result};
use serde::Serialize;
use std::io::Write;

/// Magic number at the start of every decompressed payload
pub const MAGIC_NUMBER: [u8; 4] = *b"ZFLD";

/// Current payload format version
pub const FORMAT_VERSION: u16 = 1;

/// Payload header size in bytes (magic + version + content crc)
pub const HEADER_SIZE: usize = 10;

/// Fixed bytes per entry record, excluding the path itself
pub const ENTRY_FIXED_SIZE: usize = 5;

/// Metadata for one packed file
///
/// The content offset is never stored; it is the sum of the lengths of all
/// preceding entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: String,
    pub length: u32,
}

impl FileEntry {
    /// Write the entry record: path length (u8), file length (u32), path bytes
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let path_bytes = self.path.as_bytes();
        let path_len = u8::try_from(path_bytes.len()).map_err(|_| {
            FoldpackError::PathTooLong {
                path: self.path.clone(),
                length: path_bytes.len(),
                max: u8::MAX as usize,
            }
        })?;

        writer.write_all(&[path_len])?;
        writer.write_all(&self.length.to_le_bytes())?;
        writer.write_all(path_bytes)?;
        Ok(())
    }

    /// Read an entry record, rejecting paths longer than `max_path_length`
    pub fn read_from(reader: &mut PayloadReader<'_>, max_path_length: usize) -> Result<Self> {
        let path_len = reader.read_u8("path length")? as usize;
        let length = reader.read_u32("file length")?;

        if path_len > max_path_length {
            return Err(FoldpackError::format(format!(
                "entry path is {} bytes (max {})",
                path_len, max_path_length
            )));
        }

        let path_bytes = reader.take(path_len, "entry path")?;
        let path = String::from_utf8(path_bytes.to_vec())
            .map_err(|e| FoldpackError::format(format!("invalid UTF-8 in path: {}", e)))?;

        Ok(Self { path, length })
    }

    /// Serialized size of this record
    pub fn encoded_len(&self) -> usize {
        ENTRY_FIXED_SIZE + self.path.len()
    }
}

/// Payload header preceding the entry table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadHeader {
    pub version: u16,
    pub content_crc: u32,
}

impl PayloadHeader {
    pub fn new(content_crc: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            content_crc,
        }
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&MAGIC_NUMBER)?;
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&self.content_crc.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from(reader: &mut PayloadReader<'_>) -> Result<Self> {
        let magic = reader.take(MAGIC_NUMBER.len(), "magic number")?;
        if magic != MAGIC_NUMBER {
            return Err(FoldpackError::format("invalid magic number"));
        }

        let version = reader.read_u16("format version")?;
        if version == 0 || version > FORMAT_VERSION {
            return Err(FoldpackError::format(format!(
                "unsupported format version {}",
                version
            )));
        }

        let content_crc = reader.read_u32("content checksum")?;
        Ok(Self {
            version,
            content_crc,
        })
    }
}

/// Bounds-checked little-endian cursor over a decompressed payload
#[derive(Debug, Clone)]
pub struct PayloadReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Borrow the next `len` bytes, failing on truncated input
    pub fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(FoldpackError::format(format!(
                "truncated {}: need {} bytes at offset {}, {} remain",
                what,
                len,
                self.position,
                self.remaining()
            )));
        }
        let slice = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.take(1, what)?[0])
    }

    pub fn read_u16(&mut self, what: &str) -> Result<u16> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.take(2, what)?);
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32(&mut self, what: &str) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4, what)?);
        Ok(u32::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_layout() {
        let entry = FileEntry {
            path: "sub/b.txt".to_string(),
            length: 3,
        };

        let mut buf = Vec::new();
        entry.write_to(&mut buf).unwrap();

        assert_eq!(buf.len(), entry.encoded_len());
        assert_eq!(buf[0], 9);
        assert_eq!(&buf[1..5], &3u32.to_le_bytes());
        assert_eq!(&buf[5..], b"sub/b.txt");
    }

    #[test]
    fn test_entry_read_back() {
        let mut buf = Vec::new();
        FileEntry {
            path: "a.txt".to_string(),
            length: 0xDEADBEEF,
        }
        .write_to(&mut buf)
        .unwrap();

        let mut reader = PayloadReader::new(&buf);
        let entry = FileEntry::read_from(&mut reader, 128).unwrap();
        assert_eq!(entry.path, "a.txt");
        assert_eq!(entry.length, 0xDEADBEEF);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_entry_path_over_limit() {
        let mut buf = Vec::new();
        FileEntry {
            path: "x".repeat(20),
            length: 1,
        }
        .write_to(&mut buf)
        .unwrap();

        let mut reader = PayloadReader::new(&buf);
        assert!(matches!(
            FileEntry::read_from(&mut reader, 10),
            Err(FoldpackError::Format(_))
        ));
    }

    #[test]
    fn test_entry_path_unencodable() {
        let entry = FileEntry {
            path: "p".repeat(256),
            length: 0,
        };
        assert!(matches!(
            entry.write_to(Vec::new()),
            Err(FoldpackError::PathTooLong { .. })
        ));
    }

    #[test]
    fn test_header_layout() {
        let mut buf = Vec::new();
        PayloadHeader::new(0x01020304).write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(&buf[..4], b"ZFLD");
        assert_eq!(&buf[4..6], &[1, 0]);
        assert_eq!(&buf[6..], &[4, 3, 2, 1]);

        let parsed = PayloadHeader::read_from(&mut PayloadReader::new(&buf)).unwrap();
        assert_eq!(parsed.content_crc, 0x01020304);
    }

    #[test]
    fn test_header_rejects_bad_magic_and_version() {
        let mut buf = Vec::new();
        PayloadHeader::new(0).write_to(&mut buf).unwrap();

        let mut bad_magic = buf.clone();
        bad_magic[0] = b'X';
        assert!(PayloadHeader::read_from(&mut PayloadReader::new(&bad_magic)).is_err());

        let mut bad_version = buf.clone();
        bad_version[4] = 99;
        assert!(PayloadHeader::read_from(&mut PayloadReader::new(&bad_version)).is_err());
    }

    #[test]
    fn test_reader_truncation() {
        let data = [1u8, 2, 3];
        let mut reader = PayloadReader::new(&data);
        assert!(reader.read_u32("value").is_err());
        // Failed read does not advance
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u16("value").unwrap(), 0x0201);
        assert_eq!(reader.read_u8("value").unwrap(), 3);
        assert!(reader.read_u8("value").is_err());
    }
}
