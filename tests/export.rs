//! COCO and VOC export from datasets on disk.

use std::fs;

use labeldesk::dataset::DatasetLayout;
use labeldesk::ir::io_coco_json::write_coco_json;
use labeldesk::ir::io_voc_xml::write_voc_dir;

mod common;

fn sample(root: &std::path::Path) {
    common::structured_dataset(
        root,
        &["cat", "dog"],
        &[
            ("a", 200, 100, Some("0 0.5 0.5 0.5 0.5\n1 0.25 0.25 0.1 0.2 0.5\n")),
            ("b", 50, 50, None),
            ("c", 80, 40, Some("")),
        ],
    );
}

#[test]
fn coco_export_matches_dataset() {
    let temp = tempfile::tempdir().expect("create temp dir");
    sample(temp.path());

    let layout = DatasetLayout::discover(temp.path()).expect("discover");
    let dataset = layout.load_dataset().expect("load");
    let out = temp.path().join("output.json");
    write_coco_json(&out, &dataset).expect("write coco");

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("read")).expect("parse");

    let images = value["images"].as_array().expect("images");
    let names: Vec<&str> = images
        .iter()
        .map(|img| img["file_name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["a.bmp", "b.bmp", "c.bmp"]);
    assert_eq!(images[0]["width"], 200);
    assert_eq!(images[0]["height"], 100);

    let annotations = value["annotations"].as_array().expect("annotations");
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[1]["category_id"], 1);
    assert_eq!(annotations[1]["image_id"], 1);

    let bbox: Vec<f64> = annotations[0]["bbox"]
        .as_array()
        .expect("bbox")
        .iter()
        .map(|v| v.as_f64().expect("number"))
        .collect();
    assert_eq!(bbox, vec![50.0, 25.0, 100.0, 50.0]);

    let categories = value["categories"].as_array().expect("categories");
    assert_eq!(categories[0]["name"], "cat");
    assert_eq!(categories[1]["name"], "dog");
}

#[test]
fn voc_export_writes_parseable_xml_for_labelled_images() {
    let temp = tempfile::tempdir().expect("create temp dir");
    sample(temp.path());

    let layout = DatasetLayout::discover(temp.path()).expect("discover");
    let dataset = layout.load_dataset().expect("load");
    let out = temp.path().join("voc_xmls");
    let written = write_voc_dir(&out, &dataset).expect("write voc");

    // b has no label file; c has an empty one.
    assert_eq!(written, 2);
    assert!(!out.join("b.xml").exists());

    let xml = fs::read_to_string(out.join("a.xml")).expect("read xml");
    let doc = roxmltree::Document::parse(&xml).expect("parse xml");

    let text_of = |node: roxmltree::Node, tag: &str| -> String {
        node.children()
            .find(|child| child.has_tag_name(tag))
            .and_then(|child| child.text())
            .expect("child text")
            .to_string()
    };

    let root = doc.root_element();
    assert_eq!(text_of(root, "filename"), "a.bmp");

    let size = root
        .children()
        .find(|node| node.has_tag_name("size"))
        .expect("size");
    assert_eq!(text_of(size, "width"), "200");
    assert_eq!(text_of(size, "depth"), "3");

    let objects: Vec<_> = root
        .children()
        .filter(|node| node.has_tag_name("object"))
        .collect();
    assert_eq!(objects.len(), 2);
    assert_eq!(text_of(objects[0], "name"), "cat");
    assert_eq!(text_of(objects[1], "name"), "dog");

    let bndbox = objects[0]
        .children()
        .find(|node| node.has_tag_name("bndbox"))
        .expect("bndbox");
    let corners: Vec<String> = ["xmin", "ymin", "xmax", "ymax"]
        .iter()
        .map(|tag| text_of(bndbox, tag))
        .collect();
    assert_eq!(corners, vec!["50", "25", "150", "75"]);

    let empty = fs::read_to_string(out.join("c.xml")).expect("read xml");
    let doc = roxmltree::Document::parse(&empty).expect("parse xml");
    assert_eq!(
        doc.root_element()
            .children()
            .filter(|node| node.has_tag_name("object"))
            .count(),
        0
    );
}
