use foundation::bounds::{Interval3, Rect};
use foundation::math::precision::GEOMETRY_EPSILON;
use foundation::math::{Affine3, Axis, Polygon2, Segment2, Vec2};

use crate::source::{SourceCatalog, SourceId, local_interval};

/// Camera state needed to turn source boxes into screen geometry.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewContext {
    /// World-to-screen transform of the viewer.
    pub viewer_transform: Affine3,
    pub timepoint: u32,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl ViewContext {
    pub fn new(viewer_transform: Affine3, timepoint: u32, canvas: (u32, u32)) -> Self {
        Self {
            viewer_transform,
            timepoint,
            canvas_width: canvas.0 as f64,
            canvas_height: canvas.1 as f64,
        }
    }

    pub fn screen_rect(&self) -> Rect {
        Rect::screen(self.canvas_width, self.canvas_height)
    }
}

/// Screen-space outline of one projected box.
///
/// Convention:
/// - Screen `z` grows away from the viewer; a face is front-facing when its
///   outward normal has a negative `z` component.
/// - `front` holds every edge touching at least one front-facing face, `back`
///   the remaining edges. Edges that project to a point are dropped.
/// - `silhouette` is the convex outline of all eight projected corners.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxPaths {
    pub front: Vec<Segment2>,
    pub back: Vec<Segment2>,
    pub silhouette: Polygon2,
}

impl BoxPaths {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.silhouette.is_empty()
    }
}

/// Per-frame geometry of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedBox {
    pub source: SourceId,
    pub paths: BoxPaths,
}

/// Projects `interval` through `local_to_screen` and classifies its edges.
///
/// Degenerate input (empty or non-finite interval, singular or non-finite
/// transform, zero-area outline) yields empty paths.
pub fn render_box(interval: &Interval3, local_to_screen: &Affine3) -> BoxPaths {
    if !interval.is_solid() || !local_to_screen.is_finite() {
        return BoxPaths::empty();
    }
    let det = local_to_screen.linear_determinant();
    if !det.is_finite() || det.abs() <= GEOMETRY_EPSILON {
        return BoxPaths::empty();
    }
    let orientation = det.signum();

    let corners: [Vec2; 8] =
        std::array::from_fn(|bits| local_to_screen.apply(interval.corner(bits)).xy());

    let silhouette = Polygon2::convex_hull(&corners);
    if silhouette.area() <= GEOMETRY_EPSILON {
        return BoxPaths::empty();
    }

    // facing[k][side]: whether the face at min (0) / max (1) of axis k faces the viewer.
    let mut facing = [[false; 2]; 3];
    for axis in Axis::ALL {
        let k = axis.index();
        let ei = local_to_screen.basis(Axis::ALL[(k + 1) % 3]).xy();
        let ej = local_to_screen.basis(Axis::ALL[(k + 2) % 3]).xy();
        let normal_z = orientation * ei.cross(ej);
        if normal_z.abs() <= GEOMETRY_EPSILON {
            continue;
        }
        facing[k][1] = normal_z < 0.0;
        facing[k][0] = normal_z > 0.0;
    }

    let mut front = Vec::with_capacity(12);
    let mut back = Vec::with_capacity(12);
    for a in 0..3 {
        let b = (a + 1) % 3;
        let c = (a + 2) % 3;
        for side_b in 0..2 {
            for side_c in 0..2 {
                let base = (side_b << b) | (side_c << c);
                let segment = Segment2::new(corners[base], corners[base | (1 << a)]);
                if is_point_like(&segment) {
                    continue;
                }
                if facing[b][side_b] || facing[c][side_c] {
                    front.push(segment);
                } else {
                    back.push(segment);
                }
            }
        }
    }

    BoxPaths {
        front,
        back,
        silhouette,
    }
}

fn is_point_like(segment: &Segment2) -> bool {
    let d = segment.b - segment.a;
    d.x.abs() <= GEOMETRY_EPSILON && d.y.abs() <= GEOMETRY_EPSILON
}

/// Projects one source at the view's timepoint.
///
/// Returns `None` for sources with no box at that timepoint (absent, no voxel
/// data, or no transform); such sources are simply not part of the frame.
pub fn project_source<C: SourceCatalog + ?Sized>(
    catalog: &C,
    source: SourceId,
    view: &ViewContext,
) -> Option<ProjectedBox> {
    let interval = local_interval(catalog, source, view.timepoint)?;
    let source_to_world = catalog.source_transform(source, view.timepoint)?;
    let local_to_screen = source_to_world.then(&view.viewer_transform);
    Some(ProjectedBox {
        source,
        paths: render_box(&interval, &local_to_screen),
    })
}

/// Projects every source in `sources`, skipping unprojectable ones.
///
/// Ordering contract:
/// - Output order follows the input order.
pub fn project_sources<C, I>(catalog: &C, sources: I, view: &ViewContext) -> Vec<ProjectedBox>
where
    C: SourceCatalog + ?Sized,
    I: IntoIterator<Item = SourceId>,
{
    sources
        .into_iter()
        .filter_map(|id| project_source(catalog, id, view))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{ViewContext, project_sources, render_box};
    use crate::source::{SourceCatalog, SourceId};
    use foundation::bounds::{Interval3, Rect};
    use foundation::math::{Affine3, Axis, Segment2, Vec2, Vec3};

    fn cube(n: u64) -> Interval3 {
        Interval3::from_voxel_dimensions([n, n, n])
    }

    #[test]
    fn axis_aligned_cube_shows_its_near_face() {
        let paths = render_box(&cube(10), &Affine3::identity());

        let bounds = paths.silhouette.bounds().expect("outline");
        assert_eq!(bounds, Rect::from_origin_size(-0.5, -0.5, 10.0, 10.0));
        // Near face edges in front, far face edges behind; depth edges collapse.
        assert_eq!(paths.front.len(), 4);
        assert_eq!(paths.back.len(), 4);
    }

    #[test]
    fn obliquely_viewed_cube_has_three_front_faces() {
        let view = Affine3::rotation(Axis::X, 0.5).rotated(Axis::Y, 0.6);
        let paths = render_box(&cube(8), &view);

        assert_eq!(paths.front.len(), 9);
        assert_eq!(paths.back.len(), 3);
        assert_eq!(paths.silhouette.len(), 6);
    }

    #[test]
    fn mirrored_transform_flips_facing() {
        // Shear depth into x so the near and far faces land on different pixels.
        let sheared = Affine3::from_rows([
            [1.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ]);
        let mirrored = Affine3::from_rows([
            [1.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, -1.0, 0.0],
        ]);
        let plain = render_box(&cube(4), &sheared);
        let flipped = render_box(&cube(4), &mirrored);

        // Edge along x at local (y, z) = (min, min).
        let edge = Segment2::new(Vec2::new(-1.0, -0.5), Vec2::new(3.0, -0.5));
        assert!(plain.front.contains(&edge));
        assert!(flipped.back.contains(&edge));

        assert_eq!((plain.front.len(), plain.back.len()), (7, 5));
        assert_eq!((flipped.front.len(), flipped.back.len()), (7, 5));
        assert_eq!(plain.silhouette.area(), flipped.silhouette.area());
    }

    #[test]
    fn degenerate_boxes_are_empty() {
        let empty = Interval3::from_voxel_dimensions([0, 3, 3]);
        assert!(render_box(&empty, &Affine3::identity()).is_empty());
        assert!(render_box(&cube(3), &Affine3::scaling(1.0, 0.0, 1.0)).is_empty());
        // Edge-on: a flat image viewed exactly from the side has no area on screen.
        let side = Affine3::rotation(Axis::Y, std::f64::consts::FRAC_PI_2);
        let flat = Interval3::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(5.0, 5.0, 1.0e-12));
        assert!(render_box(&flat, &side).is_empty());
    }

    struct Catalog;

    impl SourceCatalog for Catalog {
        fn name(&self, id: SourceId) -> Option<String> {
            Some(format!("s{}", id.0))
        }

        fn is_present(&self, id: SourceId, _timepoint: u32) -> bool {
            id != SourceId(2)
        }

        fn voxel_dimensions(&self, id: SourceId, _timepoint: u32) -> Option<[u64; 3]> {
            (id != SourceId(3)).then_some([10, 10, 1])
        }

        fn source_transform(&self, id: SourceId, _timepoint: u32) -> Option<Affine3> {
            Some(Affine3::translation(Vec3::new(100.0 * id.0 as f64, 0.0, 0.0)))
        }
    }

    #[test]
    fn unprojectable_sources_are_skipped() {
        let view = ViewContext::new(Affine3::identity().scaled(2.0), 0, (800, 600));
        let ids = [SourceId(0), SourceId(1), SourceId(2), SourceId(3)];
        let boxes = project_sources(&Catalog, ids, &view);

        let got: Vec<SourceId> = boxes.iter().map(|b| b.source).collect();
        assert_eq!(got, vec![SourceId(0), SourceId(1)]);

        let b1 = boxes[1].paths.silhouette.bounds().expect("outline");
        assert_eq!(b1.min.x, 199.0);
        assert_eq!(b1.max.x, 219.0);
    }
}
