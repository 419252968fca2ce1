#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use crate::consts::MIN_CLOSED_POINTS;

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Placement of the background image inside the drawing surface.
///
/// The image is scaled to fit while preserving its aspect ratio and centered,
/// leaving letterbox bars on the axis that has slack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageFit {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fit an `image_w` x `image_h` image into a `surface_w` x `surface_h` surface.
///
/// A surface wider (relative to its height) than the image fits to the surface
/// height and centers horizontally; otherwise it fits to the width and centers
/// vertically. Returns `None` when any dimension is not positive.
#[must_use]
pub fn fit_image(surface_w: f64, surface_h: f64, image_w: f64, image_h: f64) -> Option<ImageFit> {
    if surface_w <= 0.0 || surface_h <= 0.0 || image_w <= 0.0 || image_h <= 0.0 {
        return None;
    }
    let surface_aspect = surface_w / surface_h;
    let image_aspect = image_w / image_h;

    let fit = if surface_aspect > image_aspect {
        let height = surface_h;
        let width = height * image_aspect;
        ImageFit { x: (surface_w - width) / 2.0, y: 0.0, width, height }
    } else {
        let width = surface_w;
        let height = width / image_aspect;
        ImageFit { x: 0.0, y: (surface_h - height) / 2.0, width, height }
    };
    Some(fit)
}

/// Even-odd ray casting test. Fewer than three points never contain anything.
#[must_use]
pub fn point_in_polygon(pt: Point, polygon: &[Point]) -> bool {
    if polygon.len() < MIN_CLOSED_POINTS {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for (i, vi) in polygon.iter().enumerate() {
        let vj = polygon[j];
        if ((vi.y > pt.y) != (vj.y > pt.y)) && (pt.x < (vj.x - vi.x) * (pt.y - vi.y) / (vj.y - vi.y) + vi.x) {
            inside = !inside;
        }
        j = i;
    }
    inside
}
