use std::sync::atomic::{AtomicBool, Ordering};

use foundation::bounds::Rect;
use foundation::math::Vec2;
use parking_lot::RwLock;
use scene::picking::pick_rect;
use scene::projection::{BoxPaths, ProjectedBox, ViewContext, project_sources};
use scene::selection::SelectionSet;
use scene::{SourceCatalog, SourceId, has_voxel_data};

use crate::labels::{LabelGridConfig, LabelPlacer, is_on_screen, label_anchor};
use crate::style::{OverlayStyle, OverlayStyles, StyleKind};

/// One box to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxDrawing {
    pub source: SourceId,
    pub style: StyleKind,
    pub paths: BoxPaths,
}

/// One source name, already moved off any earlier label in the same pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub source: SourceId,
    pub text: String,
    pub position: Vec2,
    pub style: StyleKind,
}

/// Everything the selection overlay draws in one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayFrame {
    pub boxes: Vec<BoxDrawing>,
    pub labels: Vec<PlacedLabel>,
    /// Rectangle of the drag in progress, if any.
    pub selection_rect: Option<Rect>,
}

/// Visible sources that have voxel data at the current timepoint.
#[derive(Debug, Default)]
struct TrackedSources {
    ids: RwLock<Vec<SourceId>>,
}

impl TrackedSources {
    fn refresh<C, I>(&self, catalog: &C, visible: I, timepoint: u32)
    where
        C: SourceCatalog + ?Sized,
        I: IntoIterator<Item = SourceId>,
    {
        let ids: Vec<SourceId> = visible
            .into_iter()
            .filter(|&id| has_voxel_data(catalog, id, timepoint))
            .collect();
        *self.ids.write() = ids;
    }

    fn get(&self) -> Vec<SourceId> {
        self.ids.read().clone()
    }
}

/// Lays out labels for the given boxes in order, skipping boxes entirely off screen.
fn place_labels<'a, C, I>(
    catalog: &C,
    boxes: I,
    screen: &Rect,
    grid: LabelGridConfig,
) -> Vec<PlacedLabel>
where
    C: SourceCatalog + ?Sized,
    I: IntoIterator<Item = (&'a ProjectedBox, StyleKind)>,
{
    let mut placer = LabelPlacer::new(grid);
    let mut labels = Vec::new();
    for (projected, style) in boxes {
        let Some(anchor) = label_anchor(&projected.paths.silhouette, screen) else {
            continue;
        };
        let text = catalog
            .name(projected.source)
            .unwrap_or_else(|| projected.source.to_string());
        labels.push(PlacedLabel {
            source: projected.source,
            text,
            position: placer.place(anchor),
            style,
        });
    }
    labels
}

/// Draws the projected box of every tracked source, coloured by selection
/// membership, with optional name labels and the active drag rectangle.
///
/// Notes:
/// - Geometry is recomputed from the live camera on every `draw` and
///   `hit_test`; only the list of tracked sources is cached.
/// - Boxes whose outline bounds do not overlap the canvas are neither drawn nor
///   labelled, but remain hittable.
#[derive(Debug)]
pub struct SelectionOverlay {
    tracked: TrackedSources,
    styles: OverlayStyles,
    show_names: AtomicBool,
    label_grid: LabelGridConfig,
}

impl Default for SelectionOverlay {
    fn default() -> Self {
        Self::new(OverlayStyles::default(), LabelGridConfig::default(), true)
    }
}

impl SelectionOverlay {
    pub fn new(styles: OverlayStyles, label_grid: LabelGridConfig, show_names: bool) -> Self {
        Self {
            tracked: TrackedSources::default(),
            styles,
            show_names: AtomicBool::new(show_names),
            label_grid,
        }
    }

    /// Re-derives the tracked sources from the host's visible set.
    pub fn update_boxes<C, I>(&self, catalog: &C, visible: I, timepoint: u32)
    where
        C: SourceCatalog + ?Sized,
        I: IntoIterator<Item = SourceId>,
    {
        self.tracked.refresh(catalog, visible, timepoint);
    }

    pub fn tracked_sources(&self) -> Vec<SourceId> {
        self.tracked.get()
    }

    pub fn show_source_names(&self) {
        self.show_names.store(true, Ordering::Relaxed);
    }

    pub fn hide_source_names(&self) {
        self.show_names.store(false, Ordering::Relaxed);
    }

    pub fn shows_source_names(&self) -> bool {
        self.show_names.load(Ordering::Relaxed)
    }

    pub fn styles(&self) -> &OverlayStyles {
        &self.styles
    }

    /// Colours and strokes to draw `drawing` with.
    pub fn style_of(&self, drawing: &BoxDrawing) -> &OverlayStyle {
        self.styles.get(drawing.style)
    }

    /// Current-frame geometry of every tracked source that can be projected.
    pub fn project<C: SourceCatalog + ?Sized>(
        &self,
        catalog: &C,
        view: &ViewContext,
    ) -> Vec<ProjectedBox> {
        project_sources(catalog, self.tracked.get(), view)
    }

    /// Sources whose outline is hit by `rect` under the current camera.
    pub fn hit_test<C: SourceCatalog + ?Sized>(
        &self,
        catalog: &C,
        view: &ViewContext,
        rect: &Rect,
    ) -> SelectionSet {
        pick_rect(rect, &self.project(catalog, view))
    }

    pub fn draw<C: SourceCatalog + ?Sized>(
        &self,
        catalog: &C,
        view: &ViewContext,
        selection: &SelectionSet,
        selection_rect: Option<Rect>,
    ) -> OverlayFrame {
        let screen = view.screen_rect();
        let projected = self.project(catalog, view);

        let on_screen: Vec<(&ProjectedBox, StyleKind)> = projected
            .iter()
            .filter(|b| is_on_screen(&b.paths.silhouette, &screen))
            .map(|b| {
                let style = if selection.contains(b.source) {
                    StyleKind::Selected
                } else {
                    StyleKind::Default
                };
                (b, style)
            })
            .collect();

        let labels = if self.shows_source_names() {
            place_labels(catalog, on_screen.iter().copied(), &screen, self.label_grid)
        } else {
            Vec::new()
        };

        OverlayFrame {
            boxes: on_screen
                .iter()
                .map(|(b, style)| BoxDrawing {
                    source: b.source,
                    style: *style,
                    paths: b.paths.clone(),
                })
                .collect(),
            labels,
            selection_rect,
        }
    }
}

/// Lays out source names without boxes, in the default style.
#[derive(Debug, Default)]
pub struct SourceNameOverlay {
    tracked: TrackedSources,
    label_grid: LabelGridConfig,
}

impl SourceNameOverlay {
    pub fn new(label_grid: LabelGridConfig) -> Self {
        Self {
            tracked: TrackedSources::default(),
            label_grid,
        }
    }

    pub fn update_boxes<C, I>(&self, catalog: &C, visible: I, timepoint: u32)
    where
        C: SourceCatalog + ?Sized,
        I: IntoIterator<Item = SourceId>,
    {
        self.tracked.refresh(catalog, visible, timepoint);
    }

    pub fn draw<C: SourceCatalog + ?Sized>(
        &self,
        catalog: &C,
        view: &ViewContext,
    ) -> Vec<PlacedLabel> {
        let screen = view.screen_rect();
        let projected = project_sources(catalog, self.tracked.get(), view);
        place_labels(
            catalog,
            projected
                .iter()
                .filter(|b| is_on_screen(&b.paths.silhouette, &screen))
                .map(|b| (b, StyleKind::Default)),
            &screen,
            self.label_grid,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{SelectionOverlay, SourceNameOverlay};
    use crate::labels::LabelGridConfig;
    use crate::style::{OverlayStyles, StyleKind};
    use foundation::bounds::Rect;
    use foundation::math::{Affine3, Vec2, Vec3};
    use pretty_assertions::assert_eq;
    use scene::projection::ViewContext;
    use scene::selection::SelectionSet;
    use scene::{SourceCatalog, SourceId};

    /// Sources 0..=2 are 20×20×1 images placed 100 apart along x;
    /// source 3 is a pseudo-source with no voxels; source 2 sits off screen.
    struct Strip;

    impl SourceCatalog for Strip {
        fn name(&self, id: SourceId) -> Option<String> {
            (id.0 != 1).then(|| format!("img{}", id.0))
        }

        fn is_present(&self, _id: SourceId, _timepoint: u32) -> bool {
            true
        }

        fn voxel_dimensions(&self, id: SourceId, _timepoint: u32) -> Option<[u64; 3]> {
            (id.0 != 3).then_some([20, 20, 1])
        }

        fn source_transform(&self, id: SourceId, _timepoint: u32) -> Option<Affine3> {
            let x = if id.0 == 2 { 5000.0 } else { 100.0 * id.0 as f64 + 0.5 };
            Some(Affine3::translation(Vec3::new(x, 0.5, 0.0)))
        }
    }

    fn view() -> ViewContext {
        ViewContext::new(Affine3::identity(), 0, (400, 300))
    }

    fn ids(n: u32) -> impl Iterator<Item = SourceId> {
        (0..n).map(SourceId)
    }

    #[test]
    fn pseudo_sources_are_not_tracked() {
        let overlay = SelectionOverlay::default();
        overlay.update_boxes(&Strip, ids(4), 0);
        assert_eq!(
            overlay.tracked_sources(),
            vec![SourceId(0), SourceId(1), SourceId(2)]
        );
    }

    #[test]
    fn draw_colours_by_membership_and_gates_off_screen_boxes() {
        let overlay = SelectionOverlay::default();
        overlay.update_boxes(&Strip, ids(4), 0);
        let selection: SelectionSet = [SourceId(1)].into_iter().collect();
        let drag = Some(Rect::from_origin_size(5.0, 5.0, 10.0, 10.0));

        let frame = overlay.draw(&Strip, &view(), &selection, drag);

        let styled: Vec<(SourceId, StyleKind)> =
            frame.boxes.iter().map(|b| (b.source, b.style)).collect();
        assert_eq!(
            styled,
            vec![
                (SourceId(0), StyleKind::Default),
                (SourceId(1), StyleKind::Selected),
            ]
        );
        assert_eq!(frame.selection_rect, drag);

        let texts: Vec<&str> = frame.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["img0", "source#1"]);
        assert_eq!(frame.labels[0].position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn drawings_resolve_to_configured_styles() {
        let mut styles = OverlayStyles::default();
        styles.selected.front_color = [1, 2, 3, 255];
        let overlay = SelectionOverlay::new(styles, LabelGridConfig::default(), false);
        overlay.update_boxes(&Strip, ids(2), 0);
        let selection: SelectionSet = [SourceId(0)].into_iter().collect();

        let frame = overlay.draw(&Strip, &view(), &selection, None);

        assert_eq!(overlay.style_of(&frame.boxes[0]).front_color, [1, 2, 3, 255]);
        assert_eq!(
            overlay.style_of(&frame.boxes[1]),
            &overlay.styles().default
        );
    }

    #[test]
    fn hidden_names_produce_no_labels() {
        let overlay = SelectionOverlay::default();
        overlay.update_boxes(&Strip, ids(3), 0);
        overlay.hide_source_names();
        let frame = overlay.draw(&Strip, &view(), &SelectionSet::new(), None);
        assert_eq!(frame.boxes.len(), 2);
        assert!(frame.labels.is_empty());

        overlay.show_source_names();
        let frame = overlay.draw(&Strip, &view(), &SelectionSet::new(), None);
        assert_eq!(frame.labels.len(), 2);
    }

    #[test]
    fn hit_test_uses_current_camera() {
        let overlay = SelectionOverlay::default();
        overlay.update_boxes(&Strip, ids(3), 0);
        let rect = Rect::from_origin_size(105.0, 5.0, 1.0, 1.0);

        let hits = overlay.hit_test(&Strip, &view(), &rect);
        assert_eq!(hits.to_vec(), vec![SourceId(1)]);

        // Camera moved 100 px to the right: source 0 is under the cursor now.
        let shifted = Affine3::translation(Vec3::new(100.0, 0.0, 0.0));
        let moved = ViewContext::new(shifted, 0, (400, 300));
        let hits = overlay.hit_test(&Strip, &moved, &rect);
        assert_eq!(hits.to_vec(), vec![SourceId(0)]);
    }

    #[test]
    fn name_overlay_lays_out_default_labels() {
        let names = SourceNameOverlay::default();
        names.update_boxes(&Strip, ids(4), 0);
        let labels = names.draw(&Strip, &view());
        assert_eq!(labels.len(), 2);
        assert!(labels.iter().all(|l| l.style == StyleKind::Default));
    }
}
