#![no_main]

use foldpack::Archive;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary payloads must never panic
    let archive = match Archive::from_bytes(data) {
        Ok(a) => a,
        Err(_) => return, // Expected for invalid data
    };

    // A parsed archive upholds the offset invariant
    let mut end = 0;
    for i in 0..archive.len() {
        let range = archive.entry_range(i).unwrap();
        assert_eq!(range.start, end);
        end = range.end;
        let _ = archive.get_file_bytes(i).unwrap();
    }
    assert_eq!(end, archive.content_length());

    // And serializes back to the same bytes
    assert_eq!(archive.to_bytes().unwrap(), data);
});
