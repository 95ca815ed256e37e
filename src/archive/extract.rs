use crate::archive::builder::Archive;
use crate::error::{FoldpackError, Result};
use crate::path::{ensure_directories, join};
use std::fs;
use std::path::Path;

/// Entry path relative to the output directory
///
/// Leading `/` is dropped so absolute source paths land under the output.
/// Paths with `..` segments or nothing left are rejected.
fn relative_entry_path(path: &str) -> Result<&str> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() || relative.split('/').any(|segment| segment == "..") {
        return Err(FoldpackError::UnsafePath(path.to_string()));
    }
    Ok(relative)
}

impl Archive {
    /// Write every entry as a file under `output`
    ///
    /// Fails with `AlreadyExists` when `output` exists and `overwrite` is
    /// false. All entry paths are checked before anything is written. The
    /// first write failure aborts the extraction. Returns the number of files
    /// written.
    pub fn extract_to<P: AsRef<Path>>(&self, output: P, overwrite: bool) -> Result<usize> {
        let output = output.as_ref();
        let base = output
            .to_str()
            .ok_or_else(|| FoldpackError::NonUtf8Path(output.to_path_buf()))?;
        let base = base.trim_end_matches('/');

        if output.exists() && !overwrite {
            return Err(FoldpackError::AlreadyExists(output.to_path_buf()));
        }

        for entry in self.entries() {
            relative_entry_path(&entry.path)?;
        }

        if base.is_empty() {
            // Output is the filesystem root
            return Err(FoldpackError::UnsafePath(output.display().to_string()));
        }
        ensure_directories(base)?;

        let mut written = 0;
        for (entry, bytes) in self.iter() {
            let target = join(base, relative_entry_path(&entry.path)?, usize::MAX)?;
            if let Some((parent, _)) = target.rsplit_once('/') {
                ensure_directories(parent)?;
            }

            fs::write(&target, bytes)?;
            tracing::debug!(path = %target, bytes = bytes.len(), "extracted file");
            written += 1;
        }

        tracing::info!(output = %base, files = written, "extracted archive");
        Ok(written)
    }
}
