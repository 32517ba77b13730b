use std::env;
use std::f64::consts::PI;
use std::sync::Arc;

use foundation::math::{Affine3, Axis, Vec2, Vec3};
use layers::labels::LabelGridConfig;
use layers::overlay::SourceNameOverlay;
use scene::selection::{SelectionMode, SelectionSet};
use selector::memory::InMemoryViewer;
use selector::{
    SelectedSourcesListener, SelectorAction, SelectorConfig, SourceSelector, ToggleListener,
    Viewer, ViewerStateChange,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const BLOBS: [u64; 3] = [256, 254, 1];
const MRI: [u64; 3] = [186, 226, 27];

struct LoggingListener;

impl SelectedSourcesListener for LoggingListener {
    fn selection_updated(&self, selection: &SelectionSet, origin: &str) {
        info!("trigger {origin}: {} sources selected", selection.len());
    }

    fn last_event(&self, delta: &SelectionSet, mode: SelectionMode, origin: &str) {
        info!("{mode} {} ({origin})", delta.len());
    }
}

struct ModeLogger;

impl ToggleListener for ModeLogger {
    fn enabled(&self) {
        info!("selection mode enabled");
    }

    fn disabled(&self) {
        info!("selection mode disabled");
    }
}

fn load_config() -> SelectorConfig {
    let Ok(path) = env::var("SELECTOR_CONFIG") else {
        return SelectorConfig::default();
    };
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| SelectorConfig::from_json_str(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => config,
        Err(err) => {
            warn!("ignoring {path}: {err}");
            SelectorConfig::default()
        }
    }
}

fn demo_viewer() -> Arc<InMemoryViewer> {
    let viewer = Arc::new(InMemoryViewer::new((800, 600), 10));
    let mri = viewer.add_source("mri-stack", MRI, Affine3::identity());

    let rot_x = Affine3::rotation(Axis::X, PI / 4.0).translated(Vec3::new(256.0, 0.0, 0.0));
    let mut members = vec![mri];
    for name in ["Blobs Rot X", "Blobs Rot X_2", "Blobs Rot X_3", "Blobs Rot X_4"] {
        members.push(viewer.add_source(name, BLOBS, rot_x));
    }
    let rot_z = Affine3::rotation(Axis::Z, PI / 4.0).translated(Vec3::new(0.0, 256.0, 0.0));
    members.push(viewer.add_source("Blobs Rot Z", BLOBS, rot_z));
    let rot_zy = Affine3::rotation(Axis::Z, PI / 6.0)
        .rotated(Axis::X, PI / 720.0)
        .translated(Vec3::new(312.0, 256.0, 0.0));
    members.push(viewer.add_source("Blobs Rot Z Y", BLOBS, rot_zy));
    viewer.add_pseudo_source("Sources Name");

    let group = viewer.add_group(&members, true);
    viewer.set_current_group(Some(group));
    let camera = Affine3::identity()
        .scaled(0.75)
        .translated(Vec3::new(150.0, 100.0, 0.0));
    viewer.set_viewer_transform(camera);
    viewer.set_current_timepoint(4);
    viewer.drain_commands();
    viewer
}

fn log_frame(selector: &SourceSelector<InMemoryViewer>) {
    let frame = selector.draw();
    for drawing in &frame.boxes {
        let style = selector.overlay().style_of(drawing);
        info!(
            "  box {} {:?} front {:?}",
            drawing.source, drawing.style, style.front_color
        );
    }
    for label in &frame.labels {
        info!(
            "  {:?} {:<16} at ({:.0}, {:.0})",
            label.style, label.text, label.position.x, label.position.y
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = load_config();
    let viewer = demo_viewer();

    let names = SourceNameOverlay::new(LabelGridConfig::default());
    names.update_boxes(&*viewer, viewer.visible_sources(), viewer.current_timepoint());
    for label in names.draw(&*viewer, &viewer.view_context()) {
        let Vec2 { x, y } = label.position;
        info!("name overlay: {} at ({x:.0}, {y:.0})", label.text);
    }

    let selector = SourceSelector::with_config(viewer.clone(), config);
    selector.add_selected_sources_listener(Arc::new(LoggingListener));
    selector.add_toggle_listener(Arc::new(ModeLogger));

    // Pressing the toggle key.
    selector.perform(SelectorAction::Toggle, Vec2::default())?;
    info!(
        "timepoints after install: {} of {}",
        viewer.current_timepoint(),
        viewer.num_timepoints()
    );

    // Drag over the upper-left quarter of the canvas.
    selector.perform(SelectorAction::SetSelection, Vec2::new(10.0, 10.0))?;
    selector.update_selection(Vec2::new(200.0, 150.0));
    selector.end_selection(Vec2::new(400.0, 300.0))?;
    log_frame(&selector);

    // Programmatic API.
    let sources = viewer.visible_sources();
    selector.add(sources.iter().copied().take(3))?;
    selector.remove(sources.iter().copied().take(1))?;
    selector.clear()?;
    selector.perform(SelectorAction::SelectAllVisible, Vec2::default())?;

    // A hidden source leaves the selection.
    viewer.set_visible(sources[1], false);
    selector.on_viewer_state_changed(ViewerStateChange::VisibilityChanged);

    // Deleting the selected sources from the viewer.
    let selected = selector.get().to_vec();
    viewer.remove_sources(&selected);
    selector.on_viewer_state_changed(ViewerStateChange::SourceCountChanged);
    info!("{} sources selected after delete", selector.get().len());

    selector.detach();
    info!(
        "timepoints after uninstall: {} of {}",
        viewer.current_timepoint(),
        viewer.num_timepoints()
    );
    Ok(())
}
