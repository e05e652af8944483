//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic or projected bounding box.
///
/// For geographic coordinates the units are degrees; for projected
/// coordinates (UTM) the units are meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Expand the box by `fraction` of each axis range on every side.
    ///
    /// Used to keep a margin around the target geometry in the rendered
    /// frame regardless of its aspect ratio.
    pub fn with_margin(&self, fraction: f64) -> Self {
        let pad_x = self.width() * fraction;
        let pad_y = self.height() * fraction;
        Self {
            min_x: self.min_x - pad_x,
            min_y: self.min_y - pad_y,
            max_x: self.max_x + pad_x,
            max_y: self.max_y + pad_y,
        }
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_expands_every_side() {
        let bbox = BoundingBox::new(100.0, 200.0, 300.0, 600.0);
        let padded = bbox.with_margin(0.15);

        // 15% of each axis range, applied symmetrically.
        assert!((padded.min_x - (100.0 - 30.0)).abs() < 1e-9);
        assert!((padded.max_x - (300.0 + 30.0)).abs() < 1e-9);
        assert!((padded.min_y - (200.0 - 60.0)).abs() < 1e-9);
        assert!((padded.max_y - (600.0 + 60.0)).abs() < 1e-9);

        assert!(padded.min_x < bbox.min_x);
        assert!(padded.max_x > bbox.max_x);
        assert!(padded.width() > bbox.width());
    }

    #[test]
    fn test_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_contains_point() {
        let bbox = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
        assert!(bbox.contains_point(0.0, 0.0));
        assert!(bbox.contains_point(-10.0, 10.0));
        assert!(!bbox.contains_point(10.1, 0.0));
    }
}
