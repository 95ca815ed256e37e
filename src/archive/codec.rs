use crate::archive::builder::Archive;
use crate::archive::compression::{Compressor, ContentSize, ZstdCompressor};
use crate::archive::format::{
    FileEntry, PayloadHeader, PayloadReader, ENTRY_FIXED_SIZE, HEADER_SIZE,
};
use crate::config::Limits;
use crate::error::{FoldpackError, Result};
use std::path::Path;

/// Sizes reported after writing an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackStats {
    pub entry_count: usize,
    pub raw_size: usize,
    pub compressed_size: usize,
}

/// Largest decompressed payload an archive within `limits` can produce
pub fn max_payload_size(limits: &Limits) -> u64 {
    let table = limits.max_files as u64 * (ENTRY_FIXED_SIZE + limits.max_path_length) as u64;
    HEADER_SIZE as u64 + 4 + table + 4 + limits.max_content_length
}

impl Archive {
    /// Serialize to the uncompressed payload layout
    ///
    /// ```text
    /// magic "ZFLD" | version u16 | content crc32 u32
    /// entry_count u32
    /// entry_count x (path_len u8 | file_len u32 | path bytes)
    /// content_length u32 | content bytes
    /// ```
    ///
    /// All integers are little-endian.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let count = u32::try_from(self.len()).map_err(|_| FoldpackError::TooManyFiles {
            max: u32::MAX as usize,
        })?;
        let content_length = u32::try_from(self.content_length()).map_err(|_| {
            FoldpackError::Length(format!(
                "content of {} bytes exceeds {}",
                self.content_length(),
                u32::MAX
            ))
        })?;

        let table: usize = self.entries().iter().map(FileEntry::encoded_len).sum();
        let mut buf = Vec::with_capacity(HEADER_SIZE + 4 + table + 4 + self.content_length());

        PayloadHeader::new(crc32fast::hash(self.content())).write_to(&mut buf)?;
        buf.extend_from_slice(&count.to_le_bytes());
        for entry in self.entries() {
            entry.write_to(&mut buf)?;
        }
        buf.extend_from_slice(&content_length.to_le_bytes());
        buf.extend_from_slice(self.content());

        Ok(buf)
    }

    /// Parse an uncompressed payload with default limits
    pub fn from_bytes(payload: &[u8]) -> Result<Self> {
        Self::from_bytes_with_limits(payload, Limits::default())
    }

    /// Parse an uncompressed payload
    ///
    /// Every read is bounds-checked; the entry count is checked against
    /// `limits` before any entry is read, and the entry lengths must add up
    /// to the declared content length.
    pub fn from_bytes_with_limits(payload: &[u8], limits: Limits) -> Result<Self> {
        limits.validate()?;
        let mut reader = PayloadReader::new(payload);

        let header = PayloadHeader::read_from(&mut reader)?;

        let count = reader.read_u32("entry count")? as usize;
        if count > limits.max_files {
            return Err(FoldpackError::format(format!(
                "archive declares {} entries (max {})",
                count, limits.max_files
            )));
        }
        // Every entry needs at least its fixed-size record
        if count.saturating_mul(ENTRY_FIXED_SIZE) > reader.remaining() {
            return Err(FoldpackError::format(format!(
                "truncated entry table: {} entries declared, {} bytes remain",
                count,
                reader.remaining()
            )));
        }

        let mut entries = Vec::with_capacity(count);
        let mut total: u64 = 0;
        for _ in 0..count {
            let entry = FileEntry::read_from(&mut reader, limits.max_path_length)?;
            total += entry.length as u64;
            entries.push(entry);
        }

        let content_length = reader.read_u32("content length")?;
        if content_length as u64 > limits.max_content_length {
            return Err(FoldpackError::format(format!(
                "content of {} bytes exceeds the {} byte limit",
                content_length, limits.max_content_length
            )));
        }
        let content = reader.take(content_length as usize, "content")?;

        if total != content_length as u64 {
            return Err(FoldpackError::format(format!(
                "entry lengths sum to {} but content length is {}",
                total, content_length
            )));
        }
        if reader.remaining() != 0 {
            return Err(FoldpackError::format(format!(
                "{} trailing bytes after content",
                reader.remaining()
            )));
        }

        let actual_crc = crc32fast::hash(content);
        if actual_crc != header.content_crc {
            return Err(FoldpackError::format(format!(
                "content checksum mismatch: expected {:08x}, got {:08x}",
                header.content_crc, actual_crc
            )));
        }

        Ok(Archive::from_parts(entries, content.to_vec(), limits))
    }

    /// Compress with zstd at `level` and write to `path`
    pub fn to_file<P: AsRef<Path>>(&self, path: P, level: i32) -> Result<PackStats> {
        self.to_file_with(&ZstdCompressor, path, level)
    }

    /// Compress with `compressor` at `level` and write to `path`
    pub fn to_file_with<C, P>(&self, compressor: &C, path: P, level: i32) -> Result<PackStats>
    where
        C: Compressor + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let payload = self.to_bytes()?;
        let compressed = compressor.compress(&payload, level)?;
        std::fs::write(path, &compressed)?;

        let stats = PackStats {
            entry_count: self.len(),
            raw_size: payload.len(),
            compressed_size: compressed.len(),
        };
        tracing::info!(
            archive = %path.display(),
            compressor = compressor.name(),
            level,
            files = stats.entry_count,
            raw_bytes = stats.raw_size,
            compressed_bytes = stats.compressed_size,
            "wrote archive"
        );
        Ok(stats)
    }

    /// Read a zstd archive with default limits
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with(&ZstdCompressor, path, Limits::default())
    }

    /// Read an archive written with `compressor`
    pub fn from_file_with<C, P>(compressor: &C, path: P, limits: Limits) -> Result<Self>
    where
        C: Compressor + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let compressed = std::fs::read(path)?;
        let payload = decompress_payload(compressor, &compressed, &limits)?;
        let archive = Self::from_bytes_with_limits(&payload, limits)?;

        tracing::info!(
            archive = %path.display(),
            files = archive.len(),
            content_bytes = archive.content_length(),
            "read archive"
        );
        Ok(archive)
    }
}

/// Decompress an archive file into its payload
///
/// The decompressed size must be announced up front and fit the bound
/// implied by `limits`; the output must match the announced size exactly.
pub fn decompress_payload<C>(compressor: &C, compressed: &[u8], limits: &Limits) -> Result<Vec<u8>>
where
    C: Compressor + ?Sized,
{
    let size = match compressor.content_size(compressed) {
        ContentSize::Known(size) => size,
        ContentSize::Unknown => {
            return Err(FoldpackError::format("decompressed size is not recorded"))
        }
        ContentSize::Error => {
            return Err(FoldpackError::format("could not read decompressed size"))
        }
    };

    let max = max_payload_size(limits);
    if size > max {
        return Err(FoldpackError::format(format!(
            "declared payload of {} bytes exceeds the {} byte bound",
            size, max
        )));
    }
    let size = usize::try_from(size)
        .map_err(|_| FoldpackError::format(format!("payload of {} bytes is not addressable", size)))?;

    let payload = compressor.decompress(compressed, size)?;
    if payload.len() != size {
        return Err(FoldpackError::format(format!(
            "decompressed {} bytes, header announced {}",
            payload.len(),
            size
        )));
    }
    Ok(payload)
}
