#![allow(dead_code)]

use labeldesk::ir::{ImageDimensions, NormalizedBox, PixelBox};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Tolerance for comparing normalized coordinates after a pixel round trip.
pub const EPS_NORMALIZED: f64 = 1e-9;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_dims() -> impl Strategy<Value = ImageDimensions> {
    (1u32..=4096, 1u32..=4096).prop_map(|(w, h)| ImageDimensions::new(w, h))
}

/// A normalized box lying fully inside the image, with positive size.
pub fn arb_inside_box() -> impl Strategy<Value = NormalizedBox> {
    (0u32..80, 0.01f64..=1.0, 0.01f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(class_id, width, height, fx, fy)| {
            let half_w = width / 2.0;
            let half_h = height / 2.0;
            let x = half_w + fx * (1.0 - width);
            let y = half_h + fy * (1.0 - height);
            NormalizedBox::new(0, class_id, x, y, width, height)
        },
    )
}

/// Any normalized box with finite coordinates, possibly hanging off the image.
pub fn arb_any_box() -> impl Strategy<Value = NormalizedBox> {
    (
        0u32..80,
        -0.5f64..1.5,
        -0.5f64..1.5,
        0.0f64..1.5,
        0.0f64..1.5,
        0.0f64..=1.0,
    )
        .prop_map(|(class_id, x, y, w, h, confidence)| {
            NormalizedBox::new(0, class_id, x, y, w, h).with_confidence(confidence)
        })
}

/// A pixel box as an editor might submit it, including out-of-range values.
pub fn arb_pixel_box() -> impl Strategy<Value = PixelBox> {
    (
        0u32..10,
        -500.0f64..5000.0,
        -500.0f64..5000.0,
        -50.0f64..3000.0,
        -50.0f64..3000.0,
    )
        .prop_map(|(class_id, x, y, w, h)| PixelBox::new("p", class_id, x, y, w, h))
}
