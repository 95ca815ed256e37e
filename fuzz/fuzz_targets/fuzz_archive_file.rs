#![no_main]

use foldpack::Archive;
use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fuzz_target!(|data: &[u8]| {
    // Write fuzz data to temporary file
    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };

    if temp_file.write_all(data).is_err() || temp_file.flush().is_err() {
        return;
    }

    // Decompress + parse must never panic
    let archive = match Archive::from_file(temp_file.path()) {
        Ok(a) => a,
        Err(_) => return, // Expected for corrupted data
    };

    // Extraction stays inside the output directory or fails cleanly
    let output = match TempDir::new() {
        Ok(d) => d,
        Err(_) => return,
    };
    let _ = archive.extract_to(output.path().join("out"), false);
});
