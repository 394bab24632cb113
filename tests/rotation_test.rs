//! Integration tests for rotating points, shapes and whole pages.

use docorder::error::Error;
use docorder::{Block, BlockType, BoundingBox, Document, Geometry, Point, Polygon, Rotation};

fn rounded(p: Point) -> (f64, f64) {
    let (x, y) = p.coords().unwrap();
    (x.round(), y.round())
}

#[test]
fn test_rotation_round_trip() {
    let origins = [
        Point::new(0.0, 0.0),
        Point::new(0.5, 0.5),
        Point::new(-3.0, 7.25),
    ];
    let points = [
        Point::new(0.1, 0.9),
        Point::new(2.0, 2.0),
        Point::new(-4.5, 0.0),
    ];

    for origin in origins {
        for degrees in [-270.0, -30.0, 0.0, 13.7, 90.0, 180.0, 359.0] {
            let rotation = Rotation::new(degrees).with_origin(origin);
            for point in points {
                let back = point
                    .rotate(&rotation)
                    .and_then(|p| p.rotate(&rotation.inverse()))
                    .unwrap();
                let ((bx, by), (px, py)) = (back.coords().unwrap(), point.coords().unwrap());
                assert!((bx - px).abs() < 1e-9, "{:?} {}", origin, degrees);
                assert!((by - py).abs() < 1e-9, "{:?} {}", origin, degrees);
            }
        }
    }
}

#[test]
fn test_known_rotations() {
    let half_turn = Point::new(2.0, 2.0).rotate(&Rotation::new(180.0)).unwrap();
    assert_eq!(rounded(half_turn), (-2.0, -2.0));

    // Around the page center the same point lands at (-1, -1)
    let around_center = Point::new(2.0, 2.0)
        .rotate(&Rotation::around_center(180.0))
        .unwrap();
    assert_eq!(rounded(around_center), (-1.0, -1.0));

    let tilted = Point::new(3.0, 4.0).rotate(&Rotation::new(-30.0)).unwrap();
    assert_eq!(rounded(tilted), (5.0, 2.0));
}

#[test]
fn test_force_limits_clamps() {
    let rotation = Rotation::around_center(45.0).with_force_limits(true);
    let polygon = Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ])
    .rotate(&rotation)
    .unwrap();

    for p in polygon.points() {
        let (x, y) = p.coords().unwrap();
        assert!((0.0..=1.0).contains(&x));
        assert!((0.0..=1.0).contains(&y));
    }
}

#[test]
fn test_non_finite_inputs_are_rejected() {
    assert!(matches!(
        Point::new(f64::NAN, 0.0).rotate(&Rotation::new(10.0)),
        Err(Error::InvalidGeometry(_))
    ));
    assert!(matches!(
        Point::new(0.0, 0.0).rotate(&Rotation::new(f64::INFINITY)),
        Err(Error::InvalidGeometry(_))
    ));

    let incomplete = BoundingBox {
        width: Some(0.1),
        height: None,
        left: Some(0.0),
        top: Some(0.0),
    };
    assert!(incomplete.rotate(&Rotation::new(90.0)).is_err());
}

#[test]
fn test_quarter_turn_of_bounding_box() {
    let bbox = BoundingBox::new(0.2, 0.1, 0.1, 0.1);
    let turned = bbox.rotate(&Rotation::around_center(90.0)).unwrap();

    // A quarter turn swaps width and height
    assert!((turned.width.unwrap() - 0.1).abs() < 1e-9);
    assert!((turned.height.unwrap() - 0.2).abs() < 1e-9);
}

#[test]
fn test_rotate_page_only_touches_that_page() {
    let mut doc = Document::with_blocks(vec![
        Block::new(BlockType::Page, "p1").with_children(["w1"]),
        Block::new(BlockType::Page, "p2").with_children(["w2"]),
        Block::new(BlockType::Word, "w1").with_geometry(Geometry::from_rect(0.1, 0.1, 0.1, 0.02)),
        Block::new(BlockType::Word, "w2").with_geometry(Geometry::from_rect(0.1, 0.1, 0.1, 0.02)),
    ]);

    let count = doc.rotate_page("p1", &Rotation::around_center(90.0)).unwrap();
    assert_eq!(count, 1);

    let w1 = doc.block("w1").unwrap().geometry.as_ref().unwrap();
    let w2 = doc.block("w2").unwrap().geometry.as_ref().unwrap();
    assert_ne!(w1, w2);
    assert_eq!(w2, &Geometry::from_rect(0.1, 0.1, 0.1, 0.02));

    assert!(matches!(
        doc.rotate_page("w1", &Rotation::new(90.0)),
        Err(Error::NotAPage(_))
    ));
}
