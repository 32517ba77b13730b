//! Axis-aligned bounds.

use crate::math::{Vec2, Vec3};

/// Screen-space axis-aligned rectangle (`min` inclusive, `max` inclusive).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Rect { min, max }
    }

    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect::new(Vec2::new(x, y), Vec2::new(x + width, y + height))
    }

    /// Canvas rectangle `[0, width] × [0, height]`.
    pub fn screen(width: f64, height: f64) -> Self {
        Rect::from_origin_size(0.0, 0.0, width, height)
    }

    /// Normalized rectangle spanned by a drag from `start` to `end`.
    ///
    /// Extents below 1 along either axis are raised to 1 so that a plain click
    /// (or a sub-pixel jitter) still covers a pixel.
    pub fn from_drag(start: Vec2, end: Vec2) -> Self {
        let x0 = start.x.min(end.x);
        let y0 = start.y.min(end.y);
        let w = (end.x - start.x).abs().max(1.0);
        let h = (end.y - start.y).abs().max(1.0);
        Rect::from_origin_size(x0, y0, w, h)
    }

    /// Tight bounds of a point set; `None` if empty.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let mut min = first;
        let mut max = first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Rect { min, max })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Corners in counter-clockwise order (y up), starting at `min`.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }


    /// Open-interval overlap test: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }
}

/// Closed 3D interval `[min, max]` along each axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Interval3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Interval3 {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Interval3 { min, max }
    }

    /// Voxel-centred interval of an image with `dims` voxels per axis:
    /// `[-0.5, dim - 0.5]`.
    pub fn from_voxel_dimensions(dims: [u64; 3]) -> Self {
        Interval3::new(
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(
                dims[0] as f64 - 0.5,
                dims[1] as f64 - 0.5,
                dims[2] as f64 - 0.5,
            ),
        )
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// True when every axis has a strictly positive, finite extent.
    pub fn is_solid(&self) -> bool {
        let e = self.extent();
        e.is_finite() && e.x > 0.0 && e.y > 0.0 && e.z > 0.0
    }

    /// Corner selected by `bits`: bit `k` set picks `max` along axis `k`.
    pub fn corner(&self, bits: usize) -> Vec3 {
        Vec3::new(
            if bits & 1 != 0 { self.max.x } else { self.min.x },
            if bits & 2 != 0 { self.max.y } else { self.min.y },
            if bits & 4 != 0 { self.max.z } else { self.min.z },
        )
    }
}
