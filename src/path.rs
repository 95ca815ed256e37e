//! String-level path helpers
//!
//! Archive paths are always `/`-separated strings. These helpers join and split
//! them and create the directories an extracted file needs.

use crate::error::{FoldpackError, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Normalize path to forward slashes (cross-platform compatibility)
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Join `base` and `leaf` with a single `/`, rejecting results longer than `max_length`
pub fn join(base: &str, leaf: &str, max_length: usize) -> Result<String> {
    let length = base.len() + 1 + leaf.len();
    if length > max_length {
        return Err(FoldpackError::PathTooLong {
            path: format!("{}/{}", base, leaf),
            length,
            max: max_length,
        });
    }

    let mut joined = String::with_capacity(length);
    joined.push_str(base);
    joined.push('/');
    joined.push_str(leaf);
    Ok(joined)
}

/// Split at the first `/`, returning `(segment, remainder)`
///
/// Returns `None` when the path holds no separator.
pub fn split_first_segment(path: &str) -> Option<(&str, &str)> {
    path.split_once('/')
}

/// Iterator over the ancestor prefixes of a path
///
/// For `a/b/c.txt` it yields `a` then `a/b`. Each step consumes one segment
/// of the remainder, so the sequence cannot be restarted.
#[derive(Debug)]
pub struct Ancestors<'a> {
    path: &'a str,
    remainder: &'a str,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (_, rest) = split_first_segment(self.remainder)?;
        // Separator sits right before `rest`
        let end = self.path.len() - rest.len() - 1;
        self.remainder = rest;
        Some(&self.path[..end])
    }
}

/// Lazily walk the ancestor prefixes of `path`
pub fn ancestors(path: &str) -> Ancestors<'_> {
    Ancestors {
        path,
        remainder: path,
    }
}

/// Create `dir` and every missing ancestor of it
///
/// Every prefix is checked and created in turn. A prefix that already exists
/// is fine; any other creation failure is returned.
pub fn ensure_directories(dir: &str) -> Result<()> {
    let with_leaf = format!("{}/", dir.trim_end_matches('/'));

    for prefix in ancestors(&with_leaf) {
        if prefix.is_empty() {
            continue;
        }

        let path = Path::new(prefix);
        if path.is_dir() {
            continue;
        }

        match fs::create_dir(path) {
            Ok(()) => tracing::debug!(dir = prefix, "created directory"),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_join() {
        assert_eq!(join("dir", "file.txt", 128).unwrap(), "dir/file.txt");
        assert_eq!(join("a/b", "c", 5).unwrap(), "a/b/c");
    }

    #[test]
    fn test_join_too_long() {
        match join("abc", "def", 6) {
            Err(FoldpackError::PathTooLong { path, length, max }) => {
                assert_eq!(path, "abc/def");
                assert_eq!(length, 7);
                assert_eq!(max, 6);
            }
            other => panic!("Expected PathTooLong, got: {:?}", other),
        }
    }

    #[test]
    fn test_split_first_segment() {
        assert_eq!(split_first_segment("a/b/c"), Some(("a", "b/c")));
        assert_eq!(split_first_segment("/abs"), Some(("", "abs")));
        assert_eq!(split_first_segment("plain"), None);
    }

    #[test]
    fn test_ancestors() {
        let prefixes: Vec<&str> = ancestors("out/sub/deep/file.txt").collect();
        assert_eq!(prefixes, vec!["out", "out/sub", "out/sub/deep"]);

        assert_eq!(ancestors("file.txt").count(), 0);
    }

    #[test]
    fn test_ancestors_exhausts() {
        let mut iter = ancestors("a/b");
        assert_eq!(iter.next(), Some("a"));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("a\\b\\c.txt"), "a/b/c.txt");
        assert_eq!(normalize_path("a/b"), "a/b");
    }

    #[test]
    fn test_ensure_directories() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().to_str().unwrap();
        let target = format!("{}/x/y/z", base);

        ensure_directories(&target).unwrap();
        assert!(Path::new(&target).is_dir());

        // Running again over existing directories is fine
        ensure_directories(&target).unwrap();
    }

    #[test]
    fn test_ensure_directories_blocked_by_file() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().to_str().unwrap();
        fs::write(format!("{}/blocker", base), b"file").unwrap();

        let target = format!("{}/blocker/child", base);
        assert!(ensure_directories(&target).is_err());
    }
}
