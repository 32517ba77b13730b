use foundation::bounds::Rect;
use foundation::math::{Polygon2, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Cell size of the label occupancy grid, in screen units.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelGridConfig {
    pub bucket_width: f64,
    pub row_height: f64,
}

impl Default for LabelGridConfig {
    fn default() -> Self {
        Self {
            bucket_width: 100.0,
            row_height: 20.0,
        }
    }
}

/// Greedy label placement for one draw pass.
///
/// Each label claims the grid cell under its anchor; if that cell is taken it
/// moves down one row at a time until a free cell is found. Earlier labels in
/// the pass win; there is no priority metric. Create a fresh placer per pass.
#[derive(Debug, Clone)]
pub struct LabelPlacer {
    config: LabelGridConfig,
    occupied: HashSet<u64>,
}

impl LabelPlacer {
    pub fn new(config: LabelGridConfig) -> Self {
        Self {
            config,
            occupied: HashSet::new(),
        }
    }

    /// Claims a cell for a label anchored at `anchor` and returns where to draw it.
    pub fn place(&mut self, anchor: Vec2) -> Vec2 {
        let bucket = (anchor.x / self.config.bucket_width).floor() as i32;
        let mut row = (anchor.y / self.config.row_height).floor() as i32;
        let mut shift_y = 0.0;
        while self.occupied.contains(&cell_key(bucket, row)) {
            row += 1;
            shift_y += self.config.row_height;
        }
        self.occupied.insert(cell_key(bucket, row));
        Vec2::new(anchor.x, anchor.y + shift_y)
    }

    pub fn occupied_cells(&self) -> usize {
        self.occupied.len()
    }
}

fn cell_key(cx: i32, cy: i32) -> u64 {
    ((cx as u32 as u64) << 32) | (cy as u32 as u64)
}

/// True if the outline's bounds overlap the screen (open intervals).
pub fn is_on_screen(silhouette: &Polygon2, screen: &Rect) -> bool {
    silhouette.bounds().is_some_and(|b| b.overlaps(screen))
}

/// Anchor for a source's label: the centre of the bounds of the part of its
/// outline that lies on screen.
pub fn label_anchor(silhouette: &Polygon2, screen: &Rect) -> Option<Vec2> {
    let visible = silhouette.clip_to_rect(screen);
    visible.bounds().map(|b| b.center())
}

#[cfg(test)]
mod tests {
    use super::{LabelGridConfig, LabelPlacer, is_on_screen, label_anchor};
    use foundation::bounds::Rect;
    use foundation::math::{Polygon2, Vec2};

    fn square(x: f64, y: f64, size: f64) -> Polygon2 {
        Polygon2::new(vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
        ])
    }

    #[test]
    fn second_label_in_same_cell_moves_down_one_row() {
        let mut placer = LabelPlacer::new(LabelGridConfig::default());
        // Both anchors fall in bucket 2, row 3.
        let first = placer.place(Vec2::new(250.0, 65.0));
        let second = placer.place(Vec2::new(210.0, 70.0));

        assert_eq!(first, Vec2::new(250.0, 65.0));
        assert_eq!(second, Vec2::new(210.0, 90.0));
        assert_eq!(placer.occupied_cells(), 2);
    }

    #[test]
    fn shifting_skips_every_taken_row() {
        let mut placer = LabelPlacer::new(LabelGridConfig::default());
        placer.place(Vec2::new(10.0, 10.0)); // row 0
        placer.place(Vec2::new(10.0, 30.0)); // row 1
        let third = placer.place(Vec2::new(10.0, 5.0));
        assert_eq!(third, Vec2::new(10.0, 45.0));
    }

    #[test]
    fn different_buckets_do_not_interact() {
        let mut placer = LabelPlacer::new(LabelGridConfig::default());
        let a = placer.place(Vec2::new(50.0, 10.0));
        let b = placer.place(Vec2::new(150.0, 10.0));
        assert_eq!(a.y, 10.0);
        assert_eq!(b.y, 10.0);
    }

    #[test]
    fn negative_coordinates_floor_into_their_own_cells() {
        let mut placer = LabelPlacer::new(LabelGridConfig::default());
        let a = placer.place(Vec2::new(-10.0, -5.0));
        let b = placer.place(Vec2::new(10.0, 5.0));
        assert_eq!(a, Vec2::new(-10.0, -5.0));
        assert_eq!(b, Vec2::new(10.0, 5.0));
    }

    #[test]
    fn anchor_uses_only_the_on_screen_part() {
        let screen = Rect::screen(100.0, 100.0);
        let half_off = square(-100.0, 0.0, 200.0);
        assert_eq!(label_anchor(&half_off, &screen), Some(Vec2::new(50.0, 50.0)));

        let off = square(300.0, 300.0, 10.0);
        assert!(!is_on_screen(&off, &screen));
        assert!(label_anchor(&off, &screen).is_none());
    }
}
