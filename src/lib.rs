//! Foldpack: pack a directory tree into one compressed archive file
//!
//! An [`Archive`] holds an ordered list of file entries (path and length) and
//! one contiguous buffer with every file's bytes back to back. It is built
//! from a directory walk, serialized to a small fixed layout, compressed with
//! zstd (or any [`Compressor`]), and written as a single file. Reading it back
//! reverses each step and can materialize the files under a new directory.
//!
//! # Example
//!
//! ```no_run
//! use foldpack::{Archive, LEVEL_MAX};
//!
//! // Pack a directory
//! let mut archive = Archive::new();
//! archive.add_file("hello_world.txt")?;
//! archive.add_directory("nested/folder_name", true)?;
//! archive.to_file("folder.zst", LEVEL_MAX)?;
//!
//! // Unpack it somewhere else
//! let archive = Archive::from_file("folder.zst")?;
//! archive.extract_to("output_dir", true)?;
//! # Ok::<(), foldpack::FoldpackError>(())
//! ```

// Core modules
pub mod archive;
pub mod config;
pub mod error;
pub mod path;

// Re-export commonly used types
pub use archive::{
    Archive, Compressor, ContentSize, FileEntry, Lz4Compressor, PackStats, ZstdCompressor,
    FORMAT_VERSION, LEVEL_BALANCED, LEVEL_FASTEST, LEVEL_HIGH, LEVEL_MAX, MAGIC_NUMBER,
};
pub use config::{
    Config, Limits, DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_MAX_FILES, DEFAULT_MAX_PATH_LENGTH,
    PATH_LENGTH_CEILING,
};
pub use error::{FoldpackError, Result};
