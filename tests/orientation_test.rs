//! Integration tests for page orientation estimation and correction.

use docorder::layout::{correct_page_rotation, OrientationMethod, OrientationOptions};
use docorder::model::ORIENTATION_KEY;
use docorder::{
    add_page_orientation, page_orientation, Block, BlockType, Document, Geometry, Point, Rotation,
};

/// A word centered at `(cx, cy)` turned by `angle` degrees.
fn word(id: &str, cx: f64, cy: f64, angle: f64) -> Block {
    let geometry = Geometry::from_rect(cx - 0.04, cy - 0.01, 0.08, 0.02)
        .rotated(&Rotation::new(angle).with_origin(Point::new(cx, cy)))
        .unwrap();
    Block::new(BlockType::Word, id).with_geometry(geometry)
}

/// One page per cluster center; each page holds a line of slightly jittered words.
fn document(centers: &[f64]) -> Document {
    let jitter = [-1.5, 0.5, 1.0, -0.5, 0.0];
    let mut blocks = Vec::new();
    for (p, center) in centers.iter().enumerate() {
        let word_ids: Vec<String> = (0..jitter.len()).map(|w| format!("w{}_{}", p, w)).collect();
        let line_id = format!("l{}", p);
        blocks.push(Block::new(BlockType::Page, format!("p{}", p)).with_children([line_id.clone()]));
        blocks.push(Block::new(BlockType::Line, line_id).with_children(word_ids.clone()));
        for (w, id) in word_ids.iter().enumerate() {
            blocks.push(word(id, 0.1 + 0.15 * w as f64, 0.5, center + jitter[w]));
        }
    }
    Document::with_blocks(blocks)
}

fn annotated(centers: &[f64], method: OrientationMethod) -> Vec<Option<f64>> {
    let mut doc = document(centers);
    add_page_orientation(&mut doc, &OrientationOptions::new().with_method(method)).unwrap();
    doc.pages().map(page_orientation).collect()
}

#[test]
fn test_clusters_land_in_expected_ranges() {
    for method in [OrientationMethod::CircularMean, OrientationMethod::QuadrantBucket] {
        let got = annotated(&[0.0, 10.0, 90.0, 180.0, -90.0, 270.0], method);
        let got: Vec<f64> = got.into_iter().map(|o| o.unwrap()).collect();

        assert!(got[0] > -2.0 && got[0] < 2.0, "{:?}", got);
        assert!(got[1] > 5.0 && got[1] < 15.0, "{:?}", got);
        assert!(got[2] > 80.0 && got[2] < 100.0, "{:?}", got);
        assert!(got[3].abs() > 170.0, "{:?}", got);
        assert!(got[4] > -100.0 && got[4] < -80.0, "{:?}", got);
        assert!(got[5] > -100.0 && got[5] < -80.0, "{:?}", got);
    }
}

#[test]
fn test_page_without_words_has_no_annotation() {
    let mut doc = Document::with_blocks(vec![
        Block::new(BlockType::Page, "empty"),
        Block::new(BlockType::Page, "p").with_children(["w"]),
        word("w", 0.5, 0.5, 3.0),
    ]);
    add_page_orientation(&mut doc, &OrientationOptions::default()).unwrap();

    let empty = doc.block("empty").unwrap();
    assert!(empty.custom_value(ORIENTATION_KEY).is_none());
    assert!(empty.custom.is_none());
    assert!(page_orientation(doc.block("p").unwrap()).is_some());
}

#[test]
fn test_rotate_then_estimate_then_correct() {
    for degrees in [-120.0, -45.0, 20.0, 90.0, 135.0] {
        let mut doc = document(&[0.0]);
        doc.rotate(&Rotation::around_center(degrees)).unwrap();
        add_page_orientation(&mut doc, &OrientationOptions::default()).unwrap();

        let estimate = page_orientation(doc.block("p0").unwrap()).unwrap();
        assert!((estimate - degrees).abs() < 1.0, "{} vs {}", estimate, degrees);

        let undone = correct_page_rotation(&mut doc, "p0", &OrientationOptions::default())
            .unwrap()
            .unwrap();
        assert!((undone - estimate).abs() < 1e-9);
        let after = page_orientation(doc.block("p0").unwrap()).unwrap();
        assert!(after.abs() < 1.0, "{} after correcting {}", after, degrees);
    }
}

#[test]
fn test_correct_without_annotation_is_a_no_op() {
    let mut doc = document(&[30.0]);
    let before = doc.clone();
    let undone = correct_page_rotation(&mut doc, "p0", &OrientationOptions::default()).unwrap();
    assert!(undone.is_none());
    assert_eq!(doc, before);
}
