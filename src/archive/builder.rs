use crate::archive::format::FileEntry;
use crate::config::Limits;
use crate::error::{FoldpackError, Result};
use crate::path::{join, normalize_path};
use std::fs::{self, File};
use std::io::{self, Read};
use std::ops::Range;
use std::path::Path;
use walkdir::WalkDir;

/// In-memory archive: ordered entries plus their concatenated content
///
/// Entry `i` owns the bytes `content[offset_i..offset_i + length_i]`, where
/// `offset_i` is the sum of the lengths of entries `0..i`.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<FileEntry>,
    content: Vec<u8>,
    limits: Limits,
}

impl Archive {
    /// Create an empty archive with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty archive with custom limits
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            entries: Vec::new(),
            content: Vec::new(),
            limits,
        }
    }

    /// Replace entries and content in one step
    ///
    /// Callers must have checked that the entry lengths sum to `content.len()`.
    pub(crate) fn from_parts(entries: Vec<FileEntry>, content: Vec<u8>, limits: Limits) -> Self {
        debug_assert_eq!(
            entries.iter().map(|e| e.length as usize).sum::<usize>(),
            content.len()
        );
        Self {
            entries,
            content,
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Get number of entries in archive
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All file bytes, back to back in entry order
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_length(&self) -> usize {
        self.content.len()
    }

    /// Byte range of entry `index` within [`content`](Self::content)
    pub fn entry_range(&self, index: usize) -> Result<Range<usize>> {
        let entry = self
            .entries
            .get(index)
            .ok_or(FoldpackError::IndexOutOfRange {
                index,
                count: self.entries.len(),
            })?;

        let start: usize = self.entries[..index]
            .iter()
            .map(|e| e.length as usize)
            .sum();
        Ok(start..start + entry.length as usize)
    }

    /// Content of entry `index`
    pub fn get_file_bytes(&self, index: usize) -> Result<&[u8]> {
        let range = self.entry_range(index)?;
        Ok(&self.content[range])
    }

    /// Index of the first entry stored under `path`
    pub fn find(&self, path: &str) -> Option<usize> {
        let normalized = normalize_path(path);
        self.entries.iter().position(|e| e.path == normalized)
    }

    /// Iterate entries together with their content
    pub fn iter(&self) -> Entries<'_> {
        Entries {
            entries: self.entries.iter(),
            content: &self.content,
            offset: 0,
        }
    }

    /// Add a file from disk, stored under its own path
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let archive_path = path
            .to_str()
            .map(normalize_path)
            .ok_or_else(|| FoldpackError::NonUtf8Path(path.to_path_buf()))?;
        self.add_file_as(path, &archive_path)
    }

    /// Add a file from disk, stored under `archive_path`
    pub fn add_file_as<P: AsRef<Path>>(&mut self, disk_path: P, archive_path: &str) -> Result<()> {
        let disk_path = disk_path.as_ref();
        let archive_path = normalize_path(archive_path);
        self.check_room(&archive_path)?;

        let mut file = File::open(disk_path)?;
        let reported = file.metadata()?.len();
        if reported > u32::MAX as u64 {
            return Err(FoldpackError::Length(format!(
                "{} is {} bytes, entries hold at most {}",
                disk_path.display(),
                reported,
                u32::MAX
            )));
        }
        self.check_total(reported)?;

        // Single reallocating append; roll back if the read fails part way
        let start = self.content.len();
        self.content.reserve(reported as usize);
        let read = match (&mut file).take(reported).read_to_end(&mut self.content) {
            Ok(read) => read,
            Err(e) => {
                self.content.truncate(start);
                return Err(e.into());
            }
        };

        tracing::debug!(path = %archive_path, bytes = read, "added file");
        self.entries.push(FileEntry {
            path: archive_path,
            length: read as u32,
        });
        Ok(())
    }

    /// Add an in-memory file
    pub fn add_bytes(&mut self, archive_path: &str, data: &[u8]) -> Result<()> {
        let archive_path = normalize_path(archive_path);
        self.check_room(&archive_path)?;

        let length = u32::try_from(data.len()).map_err(|_| {
            FoldpackError::Length(format!(
                "{} is {} bytes, entries hold at most {}",
                archive_path,
                data.len(),
                u32::MAX
            ))
        })?;
        self.check_total(length as u64)?;

        self.content.extend_from_slice(data);
        tracing::debug!(path = %archive_path, bytes = length, "added bytes");
        self.entries.push(FileEntry {
            path: archive_path,
            length,
        });
        Ok(())
    }

    /// Add every regular file under `path`
    ///
    /// Entries are visited in file-name order so the same tree always packs to
    /// the same entry order. Subdirectories are only entered when `recursive`
    /// is set. Symlinks and special files are skipped. A `path` that is not a
    /// directory fails with `Io`. On any error the archive is left as it was
    /// before the call.
    pub fn add_directory<P: AsRef<Path>>(&mut self, path: P, recursive: bool) -> Result<()> {
        let root = path.as_ref();
        let base = root
            .to_str()
            .map(|s| normalize_path(s).trim_end_matches('/').to_string())
            .ok_or_else(|| FoldpackError::NonUtf8Path(root.to_path_buf()))?;

        if !fs::metadata(root)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            )
            .into());
        }

        let before = (self.entries.len(), self.content.len());
        if let Err(e) = self.walk_directory(root, &base, recursive) {
            self.entries.truncate(before.0);
            self.content.truncate(before.1);
            return Err(e);
        }

        tracing::debug!(
            dir = %base,
            recursive,
            files = self.entries.len() - before.0,
            "added directory"
        );
        Ok(())
    }

    fn walk_directory(&mut self, root: &Path, base: &str, recursive: bool) -> Result<()> {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(walk_error)?;
            let file_type = entry.file_type();
            if !file_type.is_file() && !file_type.is_dir() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .ok()
                .and_then(|p| p.to_str())
                .map(normalize_path)
                .ok_or_else(|| FoldpackError::NonUtf8Path(entry.path().to_path_buf()))?;
            let archive_path = if base.is_empty() {
                relative
            } else {
                join(base, &relative, self.limits.max_path_length)?
            };

            if file_type.is_file() {
                self.add_file_as(entry.path(), &archive_path)?;
            } else {
                self.limits.check_path(&archive_path)?;
            }
        }
        Ok(())
    }

    fn check_room(&self, archive_path: &str) -> Result<()> {
        if self.entries.len() >= self.limits.max_files {
            return Err(FoldpackError::TooManyFiles {
                max: self.limits.max_files,
            });
        }
        self.limits.check_path(archive_path)
    }

    fn check_total(&self, extra: u64) -> Result<()> {
        let total = self.content.len() as u64 + extra;
        if total > self.limits.max_content_length {
            return Err(FoldpackError::Length(format!(
                "total content of {} bytes exceeds {}",
                total, self.limits.max_content_length
            )));
        }
        Ok(())
    }
}

/// Map a walk failure to an I/O error, keeping the offending path
fn walk_error(err: walkdir::Error) -> FoldpackError {
    let context = err
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    match err.into_io_error() {
        Some(io) => FoldpackError::Io(std::io::Error::new(
            io.kind(),
            format!("{}: {}", context, io),
        )),
        None => FoldpackError::Io(std::io::Error::other(format!(
            "filesystem loop at {}",
            context
        ))),
    }
}

/// Iterator over `(entry, content)` pairs
pub struct Entries<'a> {
    entries: std::slice::Iter<'a, FileEntry>,
    content: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a FileEntry, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        let end = self.offset + entry.length as usize;
        let bytes = &self.content[self.offset..end];
        self.offset = end;
        Some((entry, bytes))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}
