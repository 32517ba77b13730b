use foundation::bounds::Rect;

use crate::projection::{BoxPaths, ProjectedBox};
use crate::selection::SelectionSet;

/// True if a selection rectangle hits a projected box.
///
/// A box is hit when its silhouette intersects the rectangle, or when the
/// silhouette fully contains it (a drag made entirely inside one large source).
pub fn rect_hits_box(rect: &Rect, paths: &BoxPaths) -> bool {
    if paths.is_empty() {
        return false;
    }
    paths.silhouette.intersects_rect(rect) || paths.silhouette.contains_rect(rect)
}

/// Rectangle picking over one frame's projected boxes.
///
/// Notes:
/// - Only silhouettes are tested; front/back edges play no role.
/// - Boxes with empty geometry are never hit.
/// - The caller must pass geometry projected with the camera state current at
///   the time of the query, not geometry cached from an earlier frame.
pub fn pick_rect(rect: &Rect, boxes: &[ProjectedBox]) -> SelectionSet {
    boxes
        .iter()
        .filter(|b| rect_hits_box(rect, &b.paths))
        .map(|b| b.source)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::pick_rect;
    use crate::projection::{BoxPaths, ProjectedBox, render_box};
    use crate::source::SourceId;
    use foundation::bounds::{Interval3, Rect};
    use foundation::math::{Affine3, Vec2, Vec3};

    fn source_box(id: u32, origin: Vec3, dims: [u64; 3]) -> ProjectedBox {
        ProjectedBox {
            source: SourceId(id),
            paths: render_box(
                &Interval3::from_voxel_dimensions(dims),
                &Affine3::translation(origin),
            ),
        }
    }

    fn frame() -> Vec<ProjectedBox> {
        vec![
            source_box(0, Vec3::new(0.5, 0.5, 0.0), [100, 100, 1]),
            source_box(1, Vec3::new(200.5, 0.5, 0.0), [50, 50, 1]),
            ProjectedBox {
                source: SourceId(2),
                paths: BoxPaths::empty(),
            },
        ]
    }

    #[test]
    fn rectangle_spanning_two_sources_hits_both() {
        let rect = Rect::from_drag(Vec2::new(50.0, 10.0), Vec2::new(220.0, 20.0));
        let hits = pick_rect(&rect, &frame());
        assert_eq!(hits.to_vec(), vec![SourceId(0), SourceId(1)]);
    }

    #[test]
    fn drag_enclosed_by_one_source_still_hits_it() {
        let rect = Rect::from_drag(Vec2::new(40.0, 40.0), Vec2::new(60.0, 60.0));
        let hits = pick_rect(&rect, &frame());
        assert_eq!(hits.to_vec(), vec![SourceId(0)]);
    }

    #[test]
    fn plain_click_hits_through_one_pixel_rect() {
        let click = Vec2::new(210.0, 10.0);
        let hits = pick_rect(&Rect::from_drag(click, click), &frame());
        assert_eq!(hits.to_vec(), vec![SourceId(1)]);
    }

    #[test]
    fn empty_space_and_empty_geometry_never_hit() {
        let rect = Rect::from_drag(Vec2::new(120.0, 120.0), Vec2::new(180.0, 180.0));
        assert!(pick_rect(&rect, &frame()).is_empty());
    }
}
