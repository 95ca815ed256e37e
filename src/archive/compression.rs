use crate::error::{FoldpackError, Result};
use std::io::Read;

/// Fastest zstd level (negative levels trade ratio for speed)
pub const LEVEL_FASTEST: i32 = -5;

/// Balanced zstd level
pub const LEVEL_BALANCED: i32 = 8;

/// High compression, still reasonably quick
pub const LEVEL_HIGH: i32 = 18;

/// Maximum compression used by the packer
pub const LEVEL_MAX: i32 = 20;

/// Result of asking a compressed buffer for its decompressed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSize {
    Known(u64),
    Unknown,
    Error,
}

/// Byte-to-byte compression service used by the archive codec
///
/// Implementations must announce the decompressed size up front and must
/// decompress losslessly and deterministically.
pub trait Compressor {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn compress(&self, data: &[u8], level: i32) -> Result<Vec<u8>>;

    /// Decompressed size announced by `data`, without decoding it
    fn content_size(&self, data: &[u8]) -> ContentSize;

    /// Decompress `data` into a buffer of at most `capacity` bytes
    fn decompress(&self, data: &[u8], capacity: usize) -> Result<Vec<u8>>;
}

/// Single-frame zstd (content size recorded in the frame header)
#[derive(Debug, Clone, Copy, Default)]
pub struct ZstdCompressor;

impl Compressor for ZstdCompressor {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, data: &[u8], level: i32) -> Result<Vec<u8>> {
        zstd::bulk::compress(data, level)
            .map_err(|e| FoldpackError::Compression(format!("Zstd compression failed: {}", e)))
    }

    fn content_size(&self, data: &[u8]) -> ContentSize {
        match zstd::zstd_safe::get_frame_content_size(data) {
            Ok(Some(size)) => ContentSize::Known(size),
            Ok(None) => ContentSize::Unknown,
            Err(_) => ContentSize::Error,
        }
    }

    /// Streams the frame so the buffer grows with real output rather than
    /// the announced size
    fn decompress(&self, data: &[u8], capacity: usize) -> Result<Vec<u8>> {
        let decoder = zstd::stream::read::Decoder::with_buffer(data)
            .map_err(|e| FoldpackError::Compression(format!("Zstd decompression failed: {}", e)))?;
        let mut out = Vec::new();
        decoder
            .take((capacity as u64).saturating_add(1))
            .read_to_end(&mut out)
            .map_err(|e| FoldpackError::Compression(format!("Zstd decompression failed: {}", e)))?;
        if out.len() > capacity {
            return Err(FoldpackError::Compression(format!(
                "Zstd output exceeds capacity {}",
                capacity
            )));
        }
        Ok(out)
    }
}

/// LZ4 block with the decompressed size prepended (little-endian u32)
///
/// Ignores the compression level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Compressor;

impl Compressor for Lz4Compressor {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, data: &[u8], _level: i32) -> Result<Vec<u8>> {
        if u32::try_from(data.len()).is_err() {
            return Err(FoldpackError::Compression(format!(
                "LZ4 payload of {} bytes exceeds the size prefix",
                data.len()
            )));
        }
        Ok(lz4_flex::compress_prepend_size(data))
    }

    fn content_size(&self, data: &[u8]) -> ContentSize {
        match data.get(..4) {
            Some(prefix) => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(prefix);
                ContentSize::Known(u32::from_le_bytes(buf) as u64)
            }
            None => ContentSize::Error,
        }
    }

    fn decompress(&self, data: &[u8], capacity: usize) -> Result<Vec<u8>> {
        let decompressed = lz4_flex::decompress_size_prepended(data).map_err(|e| {
            FoldpackError::Compression(format!("LZ4 decompression failed: {}", e))
        })?;
        if decompressed.len() > capacity {
            return Err(FoldpackError::Compression(format!(
                "LZ4 output of {} bytes exceeds capacity {}",
                decompressed.len(),
                capacity
            )));
        }
        Ok(decompressed)
    }
}
