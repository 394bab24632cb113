//! Geometry primitives in page-normalized coordinates.
//!
//! Coordinates are fractions of the page size, `(0, 0)` at the top-left
//! corner with Y growing downward. Values outside `[0, 1]` are allowed.
//!
//! # Rotation sign convention
//!
//! A positive angle adds to the `atan2(dy, dx)` direction of every vector in
//! the stored frame. Since Y grows downward, that is a clockwise turn as seen
//! on the page. Rotating by `-θ` undoes a rotation by `θ`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Normalize an angle in degrees to the half-open interval `(-180, 180]`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let mut d = degrees % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// A point in page-normalized coordinates.
///
/// Either coordinate may be absent; absent values are omitted when
/// serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position
    #[serde(rename = "X", default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical position (grows downward)
    #[serde(rename = "Y", default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl Point {
    /// Create a point with both coordinates present.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Both coordinates, if present.
    pub fn coords(&self) -> Option<(f64, f64)> {
        Some((self.x?, self.y?))
    }

    /// Check that both coordinates are present and finite.
    pub fn is_finite(&self) -> bool {
        self.coords()
            .is_some_and(|(x, y)| x.is_finite() && y.is_finite())
    }

    /// Rotate this point, returning the rotated copy.
    pub fn rotate(&self, rotation: &Rotation) -> Result<Point> {
        rotation.apply(*self)
    }

    /// Direction of the vector from `self` to `other`, in degrees within `(-180, 180]`.
    pub fn angle_to(&self, other: &Point) -> Option<f64> {
        let (x0, y0) = self.coords()?;
        let (x1, y1) = other.coords()?;
        Some((y1 - y0).atan2(x1 - x0).to_degrees())
    }
}

/// A rotation by a signed angle around an origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Center of rotation
    pub origin: Point,
    /// Signed angle in degrees
    pub degrees: f64,
    /// Clamp rotated coordinates into `[0, 1]`
    pub force_limits: bool,
}

impl Rotation {
    /// Rotation around `(0, 0)`.
    pub fn new(degrees: f64) -> Self {
        Self {
            origin: Point::new(0.0, 0.0),
            degrees,
            force_limits: false,
        }
    }

    /// Rotation around the page center `(0.5, 0.5)`.
    pub fn around_center(degrees: f64) -> Self {
        Self::new(degrees).with_origin(Point::new(0.5, 0.5))
    }

    /// Set the center of rotation.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Enable or disable clamping into `[0, 1]`.
    pub fn with_force_limits(mut self, force_limits: bool) -> Self {
        self.force_limits = force_limits;
        self
    }

    /// The rotation that undoes this one (limits are kept as configured).
    pub fn inverse(&self) -> Self {
        Self {
            degrees: -self.degrees,
            ..*self
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.degrees.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "rotation angle {} is not finite",
                self.degrees
            )));
        }
        if !self.origin.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "rotation origin {:?} is not finite",
                self.origin
            )));
        }
        Ok(())
    }

    /// Apply the rotation to a single point.
    pub fn apply(&self, point: Point) -> Result<Point> {
        self.validate()?;
        let (px, py) = point.coords().ok_or_else(|| {
            Error::InvalidGeometry(format!("point {:?} is missing a coordinate", point))
        })?;
        if !(px.is_finite() && py.is_finite()) {
            return Err(Error::InvalidGeometry(format!(
                "point ({}, {}) is not finite",
                px, py
            )));
        }
        let (ox, oy) = self.origin.coords().unwrap_or_default();

        let (sin, cos) = self.degrees.to_radians().sin_cos();
        let dx = px - ox;
        let dy = py - oy;
        let mut x = ox + dx * cos - dy * sin;
        let mut y = oy + dx * sin + dy * cos;

        if self.force_limits {
            x = x.clamp(0.0, 1.0);
            y = y.clamp(0.0, 1.0);
        }

        Ok(Point::new(x, y))
    }
}

/// Axis-aligned bounding box.
///
/// Every field is optional: an absent value means "not computed" and is
/// omitted when serialized, which is not the same as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    /// Width as a fraction of the page width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height as a fraction of the page height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Left edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    /// Top edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
}

impl BoundingBox {
    /// Create a box with every field present.
    pub fn new(width: f64, height: f64, left: f64, top: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            left: Some(left),
            top: Some(top),
        }
    }

    /// Axis-aligned bounds of a set of points.
    ///
    /// Points missing a coordinate are skipped.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let mut coords = points.iter().filter_map(Point::coords);
        let (x, y) = coords.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x, y, x, y);
        for (x, y) in coords {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self::new(max_x - min_x, max_y - min_y, min_x, min_y))
    }

    /// Check if no field is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check that all four fields are present and finite.
    pub fn is_complete(&self) -> bool {
        [self.width, self.height, self.left, self.top]
            .iter()
            .all(|v| v.is_some_and(f64::is_finite))
    }

    /// Right edge, if left and width are known.
    pub fn right(&self) -> Option<f64> {
        Some(self.left? + self.width?)
    }

    /// Bottom edge, if top and height are known.
    pub fn bottom(&self) -> Option<f64> {
        Some(self.top? + self.height?)
    }

    /// Corners in polygon order: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> Option<[Point; 4]> {
        let (left, top) = (self.left?, self.top?);
        let (right, bottom) = (self.right()?, self.bottom()?);
        Some([
            Point::new(left, top),
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ])
    }

    /// Rotate the four corners and return their axis-aligned bounds.
    pub fn rotate(&self, rotation: &Rotation) -> Result<BoundingBox> {
        let corners = self.corners().ok_or_else(|| {
            Error::InvalidGeometry("cannot rotate an incomplete bounding box".to_string())
        })?;
        let rotated = corners
            .iter()
            .map(|p| rotation.apply(*p))
            .collect::<Result<Vec<_>>>()?;
        BoundingBox::from_points(&rotated)
            .ok_or_else(|| Error::InvalidGeometry("bounding box has no corners".to_string()))
    }

    /// Signed vertical overlap with another box (negative when apart).
    pub fn vertical_overlap(&self, other: &BoundingBox) -> Option<f64> {
        let top = self.top?.max(other.top?);
        let bottom = self.bottom()?.min(other.bottom()?);
        Some(bottom - top)
    }
}

/// Ordered vertices of a closed shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<Point>);

impl Polygon {
    /// Create a polygon from vertices.
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Vertices in stored order.
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rotate every vertex, preserving vertex order.
    pub fn rotate(&self, rotation: &Rotation) -> Result<Polygon> {
        self.0
            .iter()
            .map(|p| rotation.apply(*p))
            .collect::<Result<Vec<_>>>()
            .map(Polygon)
    }

    /// Axis-aligned bounds of the vertices.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.0)
    }

    /// Direction of the first edge (vertex 0 to vertex 1), in degrees.
    ///
    /// For text the first edge is the top edge read left to right, so this is
    /// the skew of the text relative to upright. `None` when either vertex is
    /// missing a coordinate.
    pub fn top_edge_angle(&self) -> Option<f64> {
        match self.0.as_slice() {
            [a, b, ..] if a.is_finite() && b.is_finite() && a != b => a.angle_to(b),
            _ => None,
        }
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

/// A block's footprint as a bounding box and a polygon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geometry {
    /// Axis-aligned bounds
    #[serde(default, skip_serializing_if = "BoundingBox::is_empty")]
    pub bounding_box: BoundingBox,
    /// Exact outline
    #[serde(default, skip_serializing_if = "Polygon::is_empty")]
    pub polygon: Polygon,
}

impl Geometry {
    /// Create a geometry from both representations.
    pub fn new(bounding_box: BoundingBox, polygon: Polygon) -> Self {
        Self {
            bounding_box,
            polygon,
        }
    }

    /// Axis-aligned rectangle with a matching four-point polygon.
    pub fn from_rect(left: f64, top: f64, width: f64, height: f64) -> Self {
        let bounding_box = BoundingBox::new(width, height, left, top);
        let polygon = bounding_box
            .corners()
            .map(|c| Polygon::new(c.to_vec()))
            .unwrap_or_default();
        Self {
            bounding_box,
            polygon,
        }
    }

    /// Return a rotated copy.
    ///
    /// With a polygon, the polygon is rotated and the bounding box re-derived
    /// from it. Without one, the bounding box is rotated by its corners.
    pub fn rotated(&self, rotation: &Rotation) -> Result<Geometry> {
        if !self.polygon.is_empty() {
            let polygon = self.polygon.rotate(rotation)?;
            let bounding_box = polygon.bounding_box().unwrap_or(self.bounding_box);
            return Ok(Geometry::new(bounding_box, polygon));
        }

        if self.bounding_box.corners().is_some() {
            return Ok(Geometry::new(
                self.bounding_box.rotate(rotation)?,
                Polygon::default(),
            ));
        }

        Ok(self.clone())
    }

    /// Rotate in place; on error the geometry is left unchanged.
    pub fn rotate(&mut self, rotation: &Rotation) -> Result<()> {
        *self = self.rotated(rotation)?;
        Ok(())
    }
}
