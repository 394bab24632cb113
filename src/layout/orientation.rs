//! Page orientation estimation.
//!
//! Every word carries its own skew: the direction of the top edge of its
//! polygon. A page's orientation is the circular central tendency of those
//! angles, so that rotating the page by the negative of the estimate brings
//! its text back upright.

use serde_json::Value;

use super::options::{OrientationMethod, OrientationOptions};
use crate::error::{Error, Result};
use crate::model::{normalize_degrees, Block, Document, Rotation, ORIENTATION_KEY};

const QUADRANTS: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// Below this mean resultant length the hints cancel out and the circular
/// mean has no direction.
const MIN_RESULTANT: f64 = 1e-9;

/// Skew of a single word, in degrees, from its polygon's top edge.
pub fn word_orientation(word: &Block) -> Option<f64> {
    word.geometry.as_ref()?.polygon.top_edge_angle()
}

/// Read back the orientation annotation of a page.
pub fn page_orientation(page: &Block) -> Option<f64> {
    page.custom_value(ORIENTATION_KEY)?.as_f64()
}

/// Split an angle into its nearest multiple of 90 and the remaining skew.
///
/// The multiple is within `(-180, 180]`; the residual within `[-45, 45]`.
pub fn split_quadrant(degrees: f64) -> (f64, f64) {
    let quadrant = normalize_degrees((degrees / 90.0).round() * 90.0);
    (quadrant, normalize_degrees(degrees - quadrant))
}

/// Combine per-word angles into one page angle within `(-180, 180]`.
///
/// Returns `None` for an empty slice.
pub fn combine_angles(angles: &[f64], method: OrientationMethod) -> Option<f64> {
    if angles.is_empty() {
        return None;
    }
    let angle = match method {
        OrientationMethod::CircularMean => {
            circular_mean(angles).or_else(|| quadrant_bucket(angles))?
        }
        OrientationMethod::QuadrantBucket => quadrant_bucket(angles)?,
    };
    Some(normalize_degrees(angle))
}

fn circular_mean(angles: &[f64]) -> Option<f64> {
    let (sin, cos) = angles.iter().fold((0.0_f64, 0.0_f64), |(s, c), a| {
        let (sa, ca) = a.to_radians().sin_cos();
        (s + sa, c + ca)
    });
    let n = angles.len() as f64;
    if (sin / n).hypot(cos / n) < MIN_RESULTANT {
        return None;
    }
    Some(sin.atan2(cos).to_degrees())
}

fn quadrant_bucket(angles: &[f64]) -> Option<f64> {
    let mut residuals: [Vec<f64>; 4] = Default::default();
    for &angle in angles {
        let (idx, residual) = QUADRANTS
            .iter()
            .enumerate()
            .map(|(i, q)| (i, normalize_degrees(angle - q)))
            .min_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))?;
        residuals[idx].push(residual);
    }

    // Most populated bucket; ties go to the lower quadrant
    let (idx, bucket) = residuals
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))?;
    if bucket.is_empty() {
        return None;
    }
    let mean = bucket.iter().sum::<f64>() / bucket.len() as f64;
    Some(QUADRANTS[idx] + mean)
}

/// Estimate the rotation of one page, without writing anything.
///
/// Returns `Ok(None)` when the page has fewer usable word angles than
/// `options.min_words`.
pub fn estimate_page_orientation(
    doc: &Document,
    page_id: &str,
    options: &OrientationOptions,
) -> Result<Option<f64>> {
    let words = doc.words(page_id)?;
    let angles: Vec<f64> = words.iter().filter_map(|w| word_orientation(w)).collect();

    if angles.len() < options.min_words.max(1) {
        log::debug!(
            "page {}: {} of {} words carry an angle, no orientation",
            page_id,
            angles.len(),
            words.len()
        );
        return Ok(None);
    }

    let estimate = combine_angles(&angles, options.method);
    log::debug!(
        "page {}: orientation {:?} from {} words ({:?})",
        page_id,
        estimate,
        angles.len(),
        options.method
    );
    Ok(estimate)
}

/// Estimate every page and store the result under `Orientation`.
///
/// Pages without a usable signal get no annotation (a stale one is removed);
/// other custom keys are left as they are.
pub fn add_page_orientation(doc: &mut Document, options: &OrientationOptions) -> Result<()> {
    for page_id in doc.page_ids() {
        let estimate = estimate_page_orientation(doc, &page_id, options)?;
        let page = doc
            .block_mut(&page_id)
            .ok_or_else(|| Error::BlockNotFound(page_id.clone()))?;
        match estimate {
            Some(degrees) => page.set_custom(ORIENTATION_KEY, Value::from(degrees)),
            None => {
                page.remove_custom(ORIENTATION_KEY);
            }
        }
    }
    Ok(())
}

/// Rotate a page by the negative of its `Orientation` annotation.
///
/// The annotation is then refreshed from the corrected geometry. Returns the
/// angle that was undone, or `None` when the page had no annotation.
pub fn correct_page_rotation(
    doc: &mut Document,
    page_id: &str,
    options: &OrientationOptions,
) -> Result<Option<f64>> {
    let Some(degrees) = page_orientation(doc.checked_page(page_id)?) else {
        return Ok(None);
    };

    doc.rotate_page(page_id, &Rotation::around_center(-degrees))?;

    let refreshed = estimate_page_orientation(doc, page_id, options)?;
    if let Some(page) = doc.block_mut(page_id) {
        match refreshed {
            Some(value) => page.set_custom(ORIENTATION_KEY, Value::from(value)),
            None => {
                page.remove_custom(ORIENTATION_KEY);
            }
        }
    }
    log::debug!(
        "page {}: undid {:.2} degrees, now {:?}",
        page_id,
        degrees,
        refreshed
    );
    Ok(Some(degrees))
}

/// Estimate and then undo the rotation of every page.
pub fn correct_rotation(doc: &mut Document, options: &OrientationOptions) -> Result<()> {
    add_page_orientation(doc, options)?;
    for page_id in doc.page_ids() {
        correct_page_rotation(doc, &page_id, options)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockType, Geometry, Point, Polygon};
    use serde_json::json;

    /// A word centered at `(cx, cy)` whose top edge points at `angle` degrees.
    fn word_at(id: &str, cx: f64, cy: f64, angle: f64) -> Block {
        let rect = Geometry::from_rect(cx - 0.05, cy - 0.01, 0.1, 0.02);
        let geometry = rect
            .rotated(&Rotation::new(angle).with_origin(Point::new(cx, cy)))
            .unwrap();
        Block::new(BlockType::Word, id).with_geometry(geometry)
    }

    fn page_with_angles(angles: &[f64]) -> Document {
        let ids: Vec<String> = (0..angles.len()).map(|i| format!("w{}", i)).collect();
        let mut blocks = vec![Block::new(BlockType::Page, "p1")
            .with_geometry(Geometry::from_rect(0.0, 0.0, 1.0, 1.0))
            .with_children(ids.clone())];
        for (i, (id, angle)) in ids.iter().zip(angles).enumerate() {
            let cy = 0.1 + 0.05 * i as f64;
            blocks.push(word_at(id, 0.5, cy, *angle));
        }
        Document::with_blocks(blocks)
    }

    fn estimate(angles: &[f64], options: &OrientationOptions) -> Option<f64> {
        let doc = page_with_angles(angles);
        estimate_page_orientation(&doc, "p1", options).unwrap()
    }

    fn both_methods() -> [OrientationOptions; 2] {
        [OrientationOptions::new(), OrientationOptions::new().bucketed()]
    }

    #[test]
    fn test_clusters_within_tolerance() {
        for options in both_methods() {
            let near_zero = estimate(&[-1.5, 0.5, 1.0, -0.3], &options).unwrap();
            assert!(-2.0 < near_zero && near_zero < 2.0, "{}", near_zero);

            let ten = estimate(&[9.0, 11.5, 10.2, 8.7], &options).unwrap();
            assert!(5.0 < ten && ten < 15.0, "{}", ten);

            let ninety = estimate(&[88.0, 91.0, 92.5, 89.5], &options).unwrap();
            assert!(80.0 < ninety && ninety < 100.0, "{}", ninety);

            let upside_down = estimate(&[176.0, 178.0, 179.0, 177.5], &options).unwrap();
            assert!(170.0 < upside_down && upside_down < 190.0, "{}", upside_down);

            let minus_ninety = estimate(&[268.0, 271.0, -91.0, -88.5], &options).unwrap();
            assert!(-100.0 < minus_ninety && minus_ninety < -80.0, "{}", minus_ninety);
        }
    }

    #[test]
    fn test_wrap_at_zero() {
        // A naive mean of these is close to 180
        for options in both_methods() {
            let value = estimate(&[359.0, 1.0, 358.5, 0.5], &options).unwrap();
            assert!(value.abs() < 2.0, "{}", value);
        }
    }

    #[test]
    fn test_wrap_at_half_turn() {
        for options in both_methods() {
            let value = estimate(&[178.0, -178.0, 179.0, -179.0], &options).unwrap();
            assert!(value.abs() > 170.0, "{}", value);
            assert!(value > -180.0 && value <= 180.0);
        }
    }

    #[test]
    fn test_opposing_hints_fall_back_to_buckets() {
        let value = combine_angles(&[0.0, 180.0], OrientationMethod::CircularMean).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_split_quadrant() {
        assert_eq!(split_quadrant(93.0), (90.0, 3.0));
        let (q, r) = split_quadrant(-92.0);
        assert_eq!(q, -90.0);
        assert!((r + 2.0).abs() < 1e-9);
        assert_eq!(split_quadrant(181.0).0, 180.0);
    }

    #[test]
    fn test_page_without_words_gets_no_annotation() {
        let mut doc = Document::with_blocks(vec![Block::new(BlockType::Page, "p1")]);
        add_page_orientation(&mut doc, &OrientationOptions::default()).unwrap();
        assert!(doc.block("p1").unwrap().custom.is_none());
        assert_eq!(page_orientation(doc.block("p1").unwrap()), None);
    }

    #[test]
    fn test_words_without_polygon_are_ignored() {
        let mut doc = page_with_angles(&[]);
        doc.add_block(Block::new(BlockType::Word, "bare"));
        doc.block_mut("p1")
            .unwrap()
            .relationships[0]
            .ids
            .push("bare".to_string());
        doc.block_mut("p1").unwrap().set_custom(ORIENTATION_KEY, json!(90));
        doc.block_mut("p1").unwrap().set_custom("mine", json!("kept"));

        add_page_orientation(&mut doc, &OrientationOptions::default()).unwrap();
        let page = doc.block("p1").unwrap();
        assert_eq!(page_orientation(page), None);
        assert_eq!(page.custom_value("mine"), Some(&json!("kept")));
    }

    #[test]
    fn test_min_words() {
        let options = OrientationOptions::new().with_min_words(3);
        assert_eq!(estimate(&[10.0, 12.0], &options), None);
        assert!(estimate(&[10.0, 12.0, 11.0], &options).is_some());
    }

    #[test]
    fn test_add_and_correct_rotation() {
        let mut doc = page_with_angles(&[0.0, 0.0, 0.0]);
        doc.rotate_page("p1", &Rotation::around_center(37.0)).unwrap();

        add_page_orientation(&mut doc, &OrientationOptions::default()).unwrap();
        let measured = page_orientation(doc.block("p1").unwrap()).unwrap();
        assert!((measured - 37.0).abs() < 1e-6);

        let undone = correct_page_rotation(&mut doc, "p1", &OrientationOptions::default())
            .unwrap()
            .unwrap();
        assert!((undone - 37.0).abs() < 1e-6);
        let after = page_orientation(doc.block("p1").unwrap()).unwrap();
        assert!(after.abs() < 1e-6);

        let word = doc.block("w0").unwrap().geometry.as_ref().unwrap();
        assert!((word.bounding_box.left.unwrap() - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_word_orientation_reads_top_edge() {
        let word = word_at("w", 0.5, 0.5, -25.0);
        assert!((word_orientation(&word).unwrap() + 25.0).abs() < 1e-9);

        let flat = Block::new(BlockType::Word, "f").with_geometry(Geometry::new(
            Default::default(),
            Polygon::new(vec![Point::new(0.1, 0.1), Point::new(0.1, 0.1)]),
        ));
        assert_eq!(word_orientation(&flat), None);
    }
}
