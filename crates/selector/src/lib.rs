// Selection mode for a multi-source viewer: rectangle picking over projected
// source boxes, a transactional selection set, and the on/off toggle.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod listeners;
pub mod memory;
pub mod toggle;

pub use config::{ConfigError, SelectorConfig};
pub use coordinator::SelectionCoordinator;
pub use error::SelectionError;
pub use host::*;
pub use listeners::{Listeners, SelectedSourcesListener, ToggleListener};
pub use toggle::{ToggleController, ToggleState};

use std::sync::Arc;

use foundation::math::Vec2;
use layers::overlay::{OverlayFrame, SelectionOverlay};
use scene::SourceId;
use scene::gesture::GestureTracker;
use scene::selection::{SelectionMode, SelectionSet};
use tracing::{debug, info};

use crate::config::{OVERLAY_ORIGIN, TOGGLE_MAP};

/// Selection mode attached to one viewer.
///
/// Construction installs the toggle binding; the selection bindings and the
/// overlay are only present while the mode is enabled. The host forwards
/// triggered actions to [`Self::perform`], drag positions to
/// [`Self::update_selection`] / [`Self::end_selection`], state changes to
/// [`Self::on_viewer_state_changed`], and draws [`Self::draw`] every frame.
pub struct SourceSelector<V: Viewer + ?Sized> {
    viewer: Arc<V>,
    config: SelectorConfig,
    coordinator: SelectionCoordinator<V>,
    toggle: ToggleController<V>,
    overlay: SelectionOverlay,
    gesture: GestureTracker,
}

impl<V: Viewer + ?Sized> std::fmt::Debug for SourceSelector<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceSelector")
            .field("coordinator", &self.coordinator)
            .field("toggle", &self.toggle)
            .field("overlay", &self.overlay)
            .finish()
    }
}

impl<V: Viewer + ?Sized> SourceSelector<V> {
    pub fn new(viewer: Arc<V>) -> Self {
        Self::with_config(viewer, SelectorConfig::default())
    }

    pub fn with_config(viewer: Arc<V>, config: SelectorConfig) -> Self {
        let overlay = SelectionOverlay::new(
            config.styles.clone(),
            config.labels,
            config.show_source_names,
        );
        let toggle = ToggleController::new(
            viewer.clone(),
            config.selection_behaviours(),
            config.blocking_behaviours(),
        );
        viewer.install_bindings(&config.toggle_behaviours());

        let selector = Self {
            coordinator: SelectionCoordinator::new(viewer.clone()),
            viewer,
            config,
            toggle,
            overlay,
            gesture: GestureTracker::new(),
        };
        selector.refresh_overlay();
        selector
    }

    pub fn viewer(&self) -> &Arc<V> {
        &self.viewer
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &SelectionCoordinator<V> {
        &self.coordinator
    }

    pub fn overlay(&self) -> &SelectionOverlay {
        &self.overlay
    }

    // Toggle.

    pub fn enable(&self) {
        self.toggle
            .switch_with(ToggleState::Installed, |target| self.prepare_switch(target));
    }

    pub fn disable(&self) {
        self.toggle
            .switch_with(ToggleState::Uninstalled, |target| self.prepare_switch(target));
    }

    pub fn toggle(&self) -> ToggleState {
        self.toggle.toggle_with(|target| self.prepare_switch(target))
    }

    pub fn is_enabled(&self) -> bool {
        self.toggle.is_enabled()
    }

    pub fn add_toggle_listener(&self, listener: Arc<dyn ToggleListener>) {
        self.toggle.add_listener(listener);
    }

    pub fn remove_toggle_listener(&self, listener: &Arc<dyn ToggleListener>) -> bool {
        self.toggle.remove_listener(listener)
    }

    /// Disables selection mode and removes the toggle binding.
    pub fn detach(&self) {
        self.disable();
        self.viewer.remove_bindings(TOGGLE_MAP);
        info!("source selector detached");
    }

    // Input.

    /// Runs the action bound to a trigger that fired at `pos`.
    ///
    /// Selection actions start a drag; finish it with [`Self::end_selection`].
    pub fn perform(&self, action: SelectorAction, pos: Vec2) -> Result<(), SelectionError> {
        match action {
            SelectorAction::Toggle => {
                let state = self.toggle();
                debug!("toggle key: selection mode {state:?}");
                Ok(())
            }
            SelectorAction::SelectAllVisible => self.select_all_visible(),
            SelectorAction::SetSelection => {
                self.begin_selection(pos, SelectionMode::Set);
                Ok(())
            }
            SelectorAction::AddSelection => {
                self.begin_selection(pos, SelectionMode::Add);
                Ok(())
            }
            SelectorAction::RemoveSelection => {
                self.begin_selection(pos, SelectionMode::Remove);
                Ok(())
            }
        }
    }

    /// Starts a rectangle drag. `mode` holds until the drag ends.
    pub fn begin_selection(&self, pos: Vec2, mode: SelectionMode) {
        if !self.is_enabled() {
            debug!("ignoring {mode} drag: selection mode is off");
            return;
        }
        self.gesture.begin(pos, mode);
        self.viewer.show_message(mode.status_message());
        self.viewer.set_cursor(CursorShape::Crosshair);
    }

    pub fn update_selection(&self, pos: Vec2) {
        if self.gesture.update(pos) {
            self.viewer.request_repaint();
        }
    }

    /// Ends the drag and applies its hits under the camera as it is now.
    pub fn end_selection(&self, pos: Vec2) -> Result<(), SelectionError> {
        let Some(done) = self.gesture.finish(pos) else {
            return Ok(());
        };
        self.viewer.set_cursor(CursorShape::Default);
        self.refresh_overlay();
        let view = self.viewer.view_context();
        let hits = self.overlay.hit_test(&*self.viewer, &view, &done.rect);
        debug!("{} drag over {:?} hit {} sources", done.mode, done.rect, hits.len());
        self.coordinator
            .apply_modification(&hits, done.mode, OVERLAY_ORIGIN)
    }

    // Selection API.

    pub fn get(&self) -> SelectionSet {
        self.coordinator.get()
    }

    pub fn add<I: IntoIterator<Item = SourceId>>(&self, sources: I) -> Result<(), SelectionError> {
        self.coordinator.add(sources, &self.config.default_origin)
    }

    pub fn add_with_origin<I: IntoIterator<Item = SourceId>>(
        &self,
        sources: I,
        origin: &str,
    ) -> Result<(), SelectionError> {
        self.coordinator.add(sources, origin)
    }

    pub fn remove<I: IntoIterator<Item = SourceId>>(
        &self,
        sources: I,
    ) -> Result<(), SelectionError> {
        self.coordinator.remove(sources, &self.config.default_origin)
    }

    pub fn remove_with_origin<I: IntoIterator<Item = SourceId>>(
        &self,
        sources: I,
        origin: &str,
    ) -> Result<(), SelectionError> {
        self.coordinator.remove(sources, origin)
    }

    pub fn clear(&self) -> Result<(), SelectionError> {
        self.coordinator.clear(&self.config.default_origin)
    }

    pub fn clear_with_origin(&self, origin: &str) -> Result<(), SelectionError> {
        self.coordinator.clear(origin)
    }

    pub fn select_all_visible(&self) -> Result<(), SelectionError> {
        self.coordinator.select_all_visible(OVERLAY_ORIGIN)
    }

    pub fn apply_modification(
        &self,
        candidates: &SelectionSet,
        mode: SelectionMode,
        origin: &str,
    ) -> Result<(), SelectionError> {
        self.coordinator.apply_modification(candidates, mode, origin)
    }

    pub fn apply_modification_str(
        &self,
        candidates: &SelectionSet,
        mode: &str,
        origin: &str,
    ) -> Result<(), SelectionError> {
        self.coordinator
            .apply_modification_str(candidates, mode, origin)
    }

    pub fn add_selected_sources_listener(&self, listener: Arc<dyn SelectedSourcesListener>) {
        self.coordinator.add_listener(listener);
    }

    pub fn remove_selected_sources_listener(
        &self,
        listener: &Arc<dyn SelectedSourcesListener>,
    ) -> bool {
        self.coordinator.remove_listener(listener)
    }

    // Host events and drawing.

    pub fn on_viewer_state_changed(&self, change: ViewerStateChange) {
        if change.affects_tracked_sources() {
            self.refresh_overlay();
        }
        self.coordinator.prune(change);
    }

    pub fn show_source_names(&self) {
        self.overlay.show_source_names();
        self.viewer.request_repaint();
    }

    pub fn hide_source_names(&self) {
        self.overlay.hide_source_names();
        self.viewer.request_repaint();
    }

    /// This frame's overlay: boxes coloured by membership, labels, and the
    /// rectangle of the drag in progress.
    pub fn draw(&self) -> OverlayFrame {
        let view = self.viewer.view_context();
        let selection = self.coordinator.get();
        self.overlay.draw(
            &*self.viewer,
            &view,
            &selection,
            self.gesture.active_rect(),
        )
    }

    /// Turning on refreshes the tracked sources; turning off drops any drag.
    fn prepare_switch(&self, target: ToggleState) {
        match target {
            ToggleState::Installed => self.refresh_overlay(),
            ToggleState::Uninstalled => {
                if self.gesture.finish(self.gesture.snapshot().current).is_some() {
                    self.viewer.set_cursor(CursorShape::Default);
                }
            }
        }
    }

    fn refresh_overlay(&self) {
        self.overlay.update_boxes(
            &*self.viewer,
            self.viewer.visible_sources(),
            self.viewer.current_timepoint(),
        );
    }
}
