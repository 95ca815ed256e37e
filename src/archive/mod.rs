mod builder;
mod codec;
mod compression;
mod extract;
mod format;

pub use builder::{Archive, Entries};
pub use codec::{decompress_payload, max_payload_size, PackStats};
pub use compression::{
    Compressor, ContentSize, Lz4Compressor, ZstdCompressor, LEVEL_BALANCED, LEVEL_FASTEST,
    LEVEL_HIGH, LEVEL_MAX,
};
pub use format::{
    FileEntry, PayloadHeader, PayloadReader, ENTRY_FIXED_SIZE, FORMAT_VERSION, HEADER_SIZE,
    MAGIC_NUMBER,
};
