use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::{debug, info};

use crate::config::OVERLAY_NAME;
use crate::host::{BehaviourMap, GroupId, OverlayHandle, Viewer};
use crate::listeners::{Listeners, ToggleListener};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ToggleState {
    Installed,
    Uninstalled,
}

/// What `install` put into the viewer, kept to undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Installation {
    overlay: OverlayHandle,
    groups: Vec<GroupId>,
}

/// Switches selection mode on and off.
///
/// Installing registers the selection bindings, attaches the overlay to the
/// view and to every display group, and blocks navigation input. Host
/// bookkeeping disturbed by attaching or detaching the overlay (timepoint
/// count and index, group membership and activity, current group) is put
/// back afterwards.
///
/// Notes:
/// - Starts uninstalled; `enable` and `disable` are no-ops in the target state.
/// - One reentrant lock serializes toggles; listeners run under it.
pub struct ToggleController<V: Viewer + ?Sized> {
    viewer: Arc<V>,
    selection_map: BehaviourMap,
    blocking_map: BehaviourMap,
    installation: ReentrantMutex<RefCell<Option<Installation>>>,
    listeners: Listeners<dyn ToggleListener>,
}

impl<V: Viewer + ?Sized> std::fmt::Debug for ToggleController<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToggleController")
            .field("state", &self.state())
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl<V: Viewer + ?Sized> ToggleController<V> {
    pub fn new(viewer: Arc<V>, selection_map: BehaviourMap, blocking_map: BehaviourMap) -> Self {
        Self {
            viewer,
            selection_map,
            blocking_map,
            installation: ReentrantMutex::new(RefCell::new(None)),
            listeners: Listeners::new(),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn ToggleListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ToggleListener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn state(&self) -> ToggleState {
        if self.installation.lock().borrow().is_some() {
            ToggleState::Installed
        } else {
            ToggleState::Uninstalled
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state() == ToggleState::Installed
    }

    pub fn enable(&self) {
        let guard = self.installation.lock();
        if guard.borrow().is_some() {
            debug!("selection mode already installed");
            return;
        }
        let installation = self.install();
        *guard.borrow_mut() = Some(installation);
        info!("selection mode installed");
        for listener in self.listeners.snapshot() {
            listener.enabled();
        }
    }

    pub fn disable(&self) {
        let guard = self.installation.lock();
        let taken = guard.borrow_mut().take();
        let Some(installation) = taken else {
            debug!("selection mode already uninstalled");
            return;
        };
        self.uninstall(installation);
        info!("selection mode uninstalled");
        for listener in self.listeners.snapshot() {
            listener.disabled();
        }
    }

    pub fn toggle(&self) -> ToggleState {
        self.toggle_with(|_| {})
    }

    /// Flips the state. See [`Self::switch_with`].
    pub fn toggle_with<F: FnOnce(ToggleState)>(&self, prepare: F) -> ToggleState {
        let _guard = self.installation.lock();
        let target = match self.state() {
            ToggleState::Installed => ToggleState::Uninstalled,
            ToggleState::Uninstalled => ToggleState::Installed,
        };
        self.switch_with(target, prepare);
        target
    }

    /// Moves to `target` under the toggle lock. `prepare` runs first, inside
    /// the same lock, and only if the state actually changes.
    pub fn switch_with<F: FnOnce(ToggleState)>(&self, target: ToggleState, prepare: F) -> bool {
        let _guard = self.installation.lock();
        if self.state() == target {
            debug!("selection mode already {target:?}");
            return false;
        }
        prepare(target);
        match target {
            ToggleState::Installed => self.enable(),
            ToggleState::Uninstalled => self.disable(),
        }
        true
    }

    fn install(&self) -> Installation {
        let viewer = &*self.viewer;
        viewer.install_bindings(&self.selection_map);

        let num_timepoints = viewer.num_timepoints();
        let current_timepoint = viewer.current_timepoint();
        let overlay = viewer.attach_overlay(OVERLAY_NAME);
        let groups = viewer.groups();
        for &group in &groups {
            viewer.add_overlay_to_group(overlay, group);
        }
        viewer.set_timepoints(num_timepoints, current_timepoint);

        viewer.install_bindings(&self.blocking_map);
        Installation { overlay, groups }
    }

    fn uninstall(&self, installation: Installation) {
        let viewer = &*self.viewer;
        for &group in &installation.groups {
            viewer.remove_overlay_from_group(installation.overlay, group);
        }

        let before = viewer.snapshot();
        viewer.detach_overlay(installation.overlay);
        viewer.set_timepoints(before.num_timepoints, before.current_timepoint);
        for group in &before.groups {
            viewer.add_sources_to_group(group.id, &group.members);
            viewer.set_group_active(group.id, group.active);
        }
        viewer.set_current_group(before.current_group);

        viewer.remove_bindings(&self.selection_map.name);
        viewer.remove_bindings(&self.blocking_map.name);
    }
}
