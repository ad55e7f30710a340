//! Fuzz target for whole label files.
//!
//! Every parsed box must keep finite coordinates and a confidence in
//! [0, 1], and every input line is either a box, blank, or reported as
//! malformed.

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use labeldesk::ir::io_yolo::parse_label_str;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = parse_label_str(content, Path::new("fuzz.txt"));

    for bbox in &parsed.boxes {
        assert!(bbox.is_finite());
        assert!((0.0..=1.0).contains(&bbox.confidence));
    }

    let non_blank = content.lines().filter(|line| !line.trim().is_empty()).count();
    assert_eq!(parsed.boxes.len() + parsed.malformed.len(), non_blank);
});
