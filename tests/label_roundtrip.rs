//! Label file read/write behaviour on disk.

use std::fs;

use labeldesk::ir::io_yolo::{read_label_file, write_label_file};
use labeldesk::ir::{BoxId, NormalizedBox};

#[test]
fn write_then_read_returns_same_boxes() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("labels/img.txt");

    let boxes = vec![
        NormalizedBox::new(0, 0, 0.5, 0.5, 0.25, 0.25),
        NormalizedBox::new(1, 3, 0.1, 0.9, 0.05, 0.1).with_confidence(0.42),
    ];
    write_label_file(&path, &boxes).expect("write");

    let parsed = read_label_file(&path).expect("read");
    assert_eq!(parsed.boxes, boxes);
    assert!(parsed.malformed.is_empty());
}

#[test]
fn rewriting_read_content_is_idempotent() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("img.txt");
    fs::write(
        &path,
        "0 0.500000 0.500000 0.250000 0.250000\n2   0.3 0.3 0.1 0.1 0.9\n",
    )
    .expect("write fixture");

    let first = read_label_file(&path).expect("first read");
    write_label_file(&path, &first.boxes).expect("rewrite");
    let first_text = fs::read_to_string(&path).expect("read text");

    let second = read_label_file(&path).expect("second read");
    write_label_file(&path, &second.boxes).expect("rewrite again");
    let second_text = fs::read_to_string(&path).expect("read text");

    assert_eq!(first.boxes, second.boxes);
    assert_eq!(first_text, second_text);
    assert_eq!(first_text, "0 0.5 0.5 0.25 0.25\n2 0.3 0.3 0.1 0.1 0.9\n");
}

#[test]
fn malformed_lines_are_skipped_and_reported() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let path = temp.path().join("img.txt");
    fs::write(
        &path,
        "0 0.5 0.5 0.2 0.2\n\
         cat 0.5 0.5 0.2 0.2\n\
         1 0.5 0.5\n\
         \n\
         1 0.4 0.4 0.1 0.1\n",
    )
    .expect("write fixture");

    let parsed = read_label_file(&path).expect("read");

    assert_eq!(parsed.boxes.len(), 2);
    assert_eq!(parsed.boxes[1].id, BoxId::new(1));
    assert_eq!(parsed.boxes[1].class_id, 1);

    let lines: Vec<usize> = parsed.malformed.iter().map(|m| m.line).collect();
    assert_eq!(lines, vec![2, 3]);

    let warnings = parsed.warnings();
    assert!(warnings[0].starts_with("Skipping invalid line 2: cat 0.5 0.5 0.2 0.2"));
}

#[test]
fn missing_and_empty_files_both_mean_no_boxes() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let missing = read_label_file(&temp.path().join("missing.txt")).expect("read missing");
    assert!(missing.is_empty());

    let empty_path = temp.path().join("empty.txt");
    write_label_file(&empty_path, &[]).expect("write empty");
    let empty = read_label_file(&empty_path).expect("read empty");
    assert!(empty.is_empty());
    assert!(empty_path.is_file());
}
