//! Entry-count and path-length limits

use foldpack::{Archive, FoldpackError, Limits};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_directory_with_too_many_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("many");
    fs::create_dir(&root).unwrap();
    for i in 0..10 {
        fs::write(root.join(format!("file{:02}.txt", i)), b"x").unwrap();
    }

    let mut archive = Archive::with_limits(Limits::new(255, 9).unwrap());
    match archive.add_directory(&root, true) {
        Err(FoldpackError::TooManyFiles { max }) => assert_eq!(max, 9),
        other => panic!("Expected TooManyFiles, got: {:?}", other),
    }
    // A failed walk leaves nothing behind
    assert!(archive.is_empty());
    assert_eq!(archive.content_length(), 0);
}

#[test]
fn test_default_file_count_limit() {
    let mut archive = Archive::new();
    for i in 0..foldpack::DEFAULT_MAX_FILES {
        archive.add_bytes(&format!("f{}", i), b"").unwrap();
    }
    assert!(matches!(
        archive.add_bytes("one_more", b""),
        Err(FoldpackError::TooManyFiles { .. })
    ));
}

#[test]
fn test_directory_path_too_long() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("d");
    let deep = root.join("a".repeat(40)).join("b".repeat(40));
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("file.txt"), b"content").unwrap();

    let base_len = root.to_str().unwrap().len();
    // Room for the first directory level but not the second
    let limits = Limits::new((base_len + 1 + 40 + 10).min(255), 16).unwrap();

    let mut archive = Archive::with_limits(limits);
    match archive.add_directory(&root, true) {
        Err(FoldpackError::PathTooLong { length, max, .. }) => assert!(length > max),
        other => panic!("Expected PathTooLong, got: {:?}", other),
    }
    assert!(archive.is_empty());
}

#[test]
fn test_path_exactly_at_limit() {
    let mut archive = Archive::new();
    let at_limit = "p".repeat(foldpack::DEFAULT_MAX_PATH_LENGTH);
    let over_limit = "p".repeat(foldpack::DEFAULT_MAX_PATH_LENGTH + 1);

    archive.add_bytes(&at_limit, b"ok").unwrap();
    assert!(matches!(
        archive.add_bytes(&over_limit, b"no"),
        Err(FoldpackError::PathTooLong { .. })
    ));

    let parsed = Archive::from_bytes(&archive.to_bytes().unwrap()).unwrap();
    assert_eq!(parsed.entries()[0].path, at_limit);
}

#[test]
fn test_file_path_too_long() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f.txt");
    fs::write(&file, b"data").unwrap();

    let mut archive = Archive::with_limits(Limits::new(4, 16).unwrap());
    assert!(matches!(
        archive.add_file(&file),
        Err(FoldpackError::PathTooLong { .. })
    ));
    archive.add_file_as(&file, "f.tx").unwrap();
    assert_eq!(archive.get_file_bytes(0).unwrap(), b"data");
}

#[test]
fn test_non_recursive_skips_subdirectories() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("top");
    fs::create_dir_all(root.join("child")).unwrap();
    fs::write(root.join("child/hidden.txt"), b"skip").unwrap();
    fs::write(root.join("visible.txt"), b"keep").unwrap();

    let mut archive = Archive::with_limits(Limits::new(255, 16).unwrap());
    archive.add_directory(&root, false).unwrap();
    assert_eq!(archive.len(), 1);
    assert!(archive.entries()[0].path.ends_with("top/visible.txt"));
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_skipped() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("links");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("real.txt"), b"real").unwrap();
    std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();

    let mut archive = Archive::with_limits(Limits::new(255, 16).unwrap());
    archive.add_directory(&root, true).unwrap();
    assert_eq!(archive.len(), 1);
    assert_eq!(archive.content(), b"real");
}
