//! Planar polygons in screen space.
//!
//! Polygons produced here are simple and, in practice, convex (hulls and
//! hulls clipped by rectangles). The predicates below are written for simple
//! polygons but only promise exact answers for convex ones.

use super::precision::{GEOMETRY_EPSILON, stable_cmp_vec2};
use super::Vec2;
use crate::bounds::Rect;

/// A closed polygon; the edge from the last vertex back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon2 {
    pub vertices: Vec<Vec2>,
}

/// A straight line segment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Segment2 {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment2 {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }
}

impl Polygon2 {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self { vertices }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Convex hull of `points` (Andrew's monotone chain).
    ///
    /// Collinear points are dropped. Fewer than three non-collinear points
    /// yield an empty polygon.
    pub fn convex_hull(points: &[Vec2]) -> Self {
        let mut pts: Vec<Vec2> = points.iter().copied().filter(|p| p.is_finite()).collect();
        pts.sort_by(|a, b| stable_cmp_vec2(*a, *b));
        pts.dedup_by(|a, b| {
            (a.x - b.x).abs() <= GEOMETRY_EPSILON && (a.y - b.y).abs() <= GEOMETRY_EPSILON
        });
        if pts.len() < 3 {
            return Self::empty();
        }

        let mut hull: Vec<Vec2> = Vec::with_capacity(pts.len() * 2);
        for p in pts.iter().copied() {
            while hull.len() >= 2
                && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= GEOMETRY_EPSILON
            {
                hull.pop();
            }
            hull.push(p);
        }
        let lower_len = hull.len() + 1;
        for p in pts.iter().rev().skip(1).copied() {
            while hull.len() >= lower_len
                && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) <= GEOMETRY_EPSILON
            {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();

        if hull.len() < 3 {
            return Self::empty();
        }
        Self::new(hull)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Unsigned area (shoelace formula).
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let mut twice = 0.0;
        for (a, b) in self.edges() {
            twice += a.cross(b);
        }
        (twice * 0.5).abs()
    }

    pub fn bounds(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Rect::from_points(&self.vertices)
    }

    /// Iterates edges `(v[i], v[i+1])`, closing the ring.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Even-odd point containment. Points exactly on an edge count as inside.
    pub fn contains_point(&self, p: Vec2) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if point_on_segment(p, a, b) {
                return true;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let x_at = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_at {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// True if the polygon and the rectangle share at least one point.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        let Some(bounds) = self.bounds() else {
            return false;
        };
        if bounds.max.x < rect.min.x
            || bounds.min.x > rect.max.x
            || bounds.max.y < rect.min.y
            || bounds.min.y > rect.max.y
        {
            return false;
        }

        if self.vertices.iter().any(|v| rect.contains_point(*v)) {
            return true;
        }
        let corners = rect.corners();
        if corners.iter().any(|c| self.contains_point(*c)) {
            return true;
        }

        for (a, b) in self.edges() {
            for i in 0..4 {
                if segments_intersect(a, b, corners[i], corners[(i + 1) % 4]) {
                    return true;
                }
            }
        }
        false
    }

    /// True if the rectangle lies entirely inside the polygon.
    ///
    /// Exact for convex polygons.
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        !self.is_empty() && rect.corners().iter().all(|c| self.contains_point(*c))
    }

    /// Clips the polygon against `rect` (Sutherland–Hodgman).
    pub fn clip_to_rect(&self, rect: &Rect) -> Polygon2 {
        if self.is_empty() {
            return Polygon2::empty();
        }
        let mut out = self.vertices.clone();
        out = clip_half_plane(&out, |p| p.x - rect.min.x);
        out = clip_half_plane(&out, |p| rect.max.x - p.x);
        out = clip_half_plane(&out, |p| p.y - rect.min.y);
        out = clip_half_plane(&out, |p| rect.max.y - p.y);
        if out.len() < 3 {
            return Polygon2::empty();
        }
        Polygon2::new(out)
    }
}

/// Twice the signed area of the triangle `(a, b, c)`; positive for a left turn.
fn turn(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b - a).cross(c - a)
}

fn point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    if turn(a, b, p).abs() > GEOMETRY_EPSILON {
        return false;
    }
    p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
}

/// Closed segment intersection (touching endpoints count).
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = turn(q1, q2, p1);
    let d2 = turn(q1, q2, p2);
    let d3 = turn(p1, p2, q1);
    let d4 = turn(p1, p2, q2);

    if straddles(d1, d2) && straddles(d3, d4) {
        return true;
    }

    point_on_segment(p1, q1, q2)
        || point_on_segment(p2, q1, q2)
        || point_on_segment(q1, p1, p2)
        || point_on_segment(q2, p1, p2)
}

fn straddles(a: f64, b: f64) -> bool {
    (a > GEOMETRY_EPSILON && b < -GEOMETRY_EPSILON) || (a < -GEOMETRY_EPSILON && b > GEOMETRY_EPSILON)
}

/// Keeps the part of `poly` where `dist(p) >= 0`.
fn clip_half_plane<F>(poly: &[Vec2], dist: F) -> Vec<Vec2>
where
    F: Fn(Vec2) -> f64,
{
    let mut out = Vec::with_capacity(poly.len() + 2);
    let n = poly.len();
    for i in 0..n {
        let cur = poly[i];
        let next = poly[(i + 1) % n];
        let dc = dist(cur);
        let dn = dist(next);
        if dc >= 0.0 {
            out.push(cur);
        }
        if (dc >= 0.0) != (dn >= 0.0) {
            let t = dc / (dc - dn);
            out.push(cur + (next - cur).scale(t));
        }
    }
    out
}
