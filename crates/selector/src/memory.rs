//! A `Viewer` that lives entirely in memory.
//!
//! It records every command it receives so tests and the demo can assert on
//! what the selector asked the host to do. It never calls back into the
//! selector: callers report state changes themselves.

use std::collections::BTreeMap;

use foundation::math::Affine3;
use parking_lot::RwLock;
use scene::{SourceCatalog, SourceId};

use crate::host::{
    BehaviourMap, CursorShape, GroupId, GroupSnapshot, OverlayHandle, Viewer, ViewerSnapshot,
};

/// A command the viewer received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    RemoveSources(Vec<SourceId>),
    RequestRepaint,
    InstallBindings(String),
    RemoveBindings(String),
    AttachOverlay(OverlayHandle),
    DetachOverlay(OverlayHandle),
    AddOverlayToGroup(OverlayHandle, GroupId),
    RemoveOverlayFromGroup(OverlayHandle, GroupId),
    SetTimepoints { count: u32, current: u32 },
    AddSourcesToGroup(GroupId, Vec<SourceId>),
    SetGroupActive(GroupId, bool),
    SetCurrentGroup(Option<GroupId>),
    ShowMessage(String),
    SetCursor(CursorShape),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemorySource {
    pub name: String,
    /// `None` for pseudo-sources that carry no voxel data.
    pub voxel_dimensions: Option<[u64; 3]>,
    pub transform: Affine3,
    pub visible: bool,
    /// First timepoint not covered by the source, if any.
    pub present_until: Option<u32>,
}

impl MemorySource {
    fn is_present(&self, timepoint: u32) -> bool {
        self.present_until.is_none_or(|end| timepoint < end)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MemoryGroup {
    id: GroupId,
    members: Vec<SourceId>,
    active: bool,
    overlays: Vec<OverlayHandle>,
}

#[derive(Debug)]
struct ViewerState {
    sources: BTreeMap<SourceId, MemorySource>,
    next_source: u32,
    viewer_transform: Affine3,
    timepoint: u32,
    num_timepoints: u32,
    canvas: (u32, u32),
    groups: Vec<MemoryGroup>,
    current_group: Option<GroupId>,
    bindings: Vec<BehaviourMap>,
    overlays: Vec<(OverlayHandle, String)>,
    next_overlay: u64,
    cursor: CursorShape,
    commands: Vec<ViewerCommand>,
}

/// In-memory host viewer.
///
/// Attaching or detaching an overlay resets the timepoint bookkeeping to a
/// single timepoint, and detaching also deactivates every group and clears the
/// current group. Hosts that register overlays as pseudo-sources behave this
/// way; the selector is expected to restore what it perturbs.
#[derive(Debug)]
pub struct InMemoryViewer {
    state: RwLock<ViewerState>,
}

impl InMemoryViewer {
    pub fn new(canvas: (u32, u32), num_timepoints: u32) -> Self {
        Self {
            state: RwLock::new(ViewerState {
                sources: BTreeMap::new(),
                next_source: 0,
                viewer_transform: Affine3::identity(),
                timepoint: 0,
                num_timepoints,
                canvas,
                groups: Vec::new(),
                current_group: None,
                bindings: Vec::new(),
                overlays: Vec::new(),
                next_overlay: 0,
                cursor: CursorShape::Default,
                commands: Vec::new(),
            }),
        }
    }

    /// Adds a visible source with voxel data.
    pub fn add_source(
        &self,
        name: impl Into<String>,
        voxel_dimensions: [u64; 3],
        transform: Affine3,
    ) -> SourceId {
        self.insert(MemorySource {
            name: name.into(),
            voxel_dimensions: Some(voxel_dimensions),
            transform,
            visible: true,
            present_until: None,
        })
    }

    /// Adds a visible source without voxel data, like an overlay decoration.
    pub fn add_pseudo_source(&self, name: impl Into<String>) -> SourceId {
        self.insert(MemorySource {
            name: name.into(),
            voxel_dimensions: None,
            transform: Affine3::identity(),
            visible: true,
            present_until: None,
        })
    }

    pub fn insert(&self, source: MemorySource) -> SourceId {
        let mut state = self.state.write();
        let id = SourceId(state.next_source);
        state.next_source += 1;
        state.sources.insert(id, source);
        id
    }

    pub fn set_visible(&self, id: SourceId, visible: bool) {
        if let Some(source) = self.state.write().sources.get_mut(&id) {
            source.visible = visible;
        }
    }

    pub fn set_viewer_transform(&self, transform: Affine3) {
        self.state.write().viewer_transform = transform;
    }

    pub fn set_current_timepoint(&self, timepoint: u32) {
        self.state.write().timepoint = timepoint;
    }

    pub fn add_group(&self, members: &[SourceId], active: bool) -> GroupId {
        let mut state = self.state.write();
        let id = GroupId(state.groups.len() as u32);
        state.groups.push(MemoryGroup {
            id,
            members: members.to_vec(),
            active,
            overlays: Vec::new(),
        });
        id
    }

    pub fn commands(&self) -> Vec<ViewerCommand> {
        self.state.read().commands.clone()
    }

    pub fn drain_commands(&self) -> Vec<ViewerCommand> {
        std::mem::take(&mut self.state.write().commands)
    }

    pub fn repaint_count(&self) -> usize {
        self.state
            .read()
            .commands
            .iter()
            .filter(|c| matches!(c, ViewerCommand::RequestRepaint))
            .count()
    }

    /// Names of the behaviour maps currently installed, in install order.
    pub fn installed_bindings(&self) -> Vec<String> {
        self.state
            .read()
            .bindings
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }


    /// Contexts blocked by any installed map.
    pub fn is_blocked(&self, context: &str) -> bool {
        self.state
            .read()
            .bindings
            .iter()
            .any(|m| m.blocked_contexts.iter().any(|c| c == context))
    }

    pub fn attached_overlays(&self) -> Vec<String> {
        self.state
            .read()
            .overlays
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }

    pub fn group_overlays(&self, group: GroupId) -> Vec<OverlayHandle> {
        self.state
            .read()
            .groups
            .iter()
            .find(|g| g.id == group)
            .map(|g| g.overlays.clone())
            .unwrap_or_default()
    }

    pub fn cursor(&self) -> CursorShape {
        self.state.read().cursor
    }

    pub fn last_message(&self) -> Option<String> {
        self.state.read().commands.iter().rev().find_map(|c| match c {
            ViewerCommand::ShowMessage(m) => Some(m.clone()),
            _ => None,
        })
    }

    fn record(state: &mut ViewerState, command: ViewerCommand) {
        state.commands.push(command);
    }
}

impl SourceCatalog for InMemoryViewer {
    fn name(&self, id: SourceId) -> Option<String> {
        self.state.read().sources.get(&id).map(|s| s.name.clone())
    }

    fn is_present(&self, id: SourceId, timepoint: u32) -> bool {
        self.state
            .read()
            .sources
            .get(&id)
            .is_some_and(|s| s.is_present(timepoint))
    }

    fn voxel_dimensions(&self, id: SourceId, timepoint: u32) -> Option<[u64; 3]> {
        let state = self.state.read();
        let source = state.sources.get(&id)?;
        if !source.is_present(timepoint) {
            return None;
        }
        source.voxel_dimensions
    }

    fn source_transform(&self, id: SourceId, _timepoint: u32) -> Option<Affine3> {
        self.state.read().sources.get(&id).map(|s| s.transform)
    }
}

impl Viewer for InMemoryViewer {
    fn visible_sources(&self) -> Vec<SourceId> {
        self.state
            .read()
            .sources
            .iter()
            .filter(|(_, s)| s.visible)
            .map(|(id, _)| *id)
            .collect()
    }

    fn is_visible(&self, id: SourceId) -> bool {
        self.state.read().sources.get(&id).is_some_and(|s| s.visible)
    }

    fn viewer_transform(&self) -> Affine3 {
        self.state.read().viewer_transform
    }

    fn current_timepoint(&self) -> u32 {
        self.state.read().timepoint
    }

    fn num_timepoints(&self) -> u32 {
        self.state.read().num_timepoints
    }

    fn canvas_size(&self) -> (u32, u32) {
        self.state.read().canvas
    }

    fn groups(&self) -> Vec<GroupId> {
        self.state.read().groups.iter().map(|g| g.id).collect()
    }

    fn snapshot(&self) -> ViewerSnapshot {
        let state = self.state.read();
        ViewerSnapshot {
            num_timepoints: state.num_timepoints,
            current_timepoint: state.timepoint,
            current_group: state.current_group,
            groups: state
                .groups
                .iter()
                .map(|g| GroupSnapshot {
                    id: g.id,
                    members: g.members.clone(),
                    active: g.active,
                })
                .collect(),
        }
    }

    fn remove_sources(&self, ids: &[SourceId]) {
        let mut state = self.state.write();
        for id in ids {
            state.sources.remove(id);
        }
        for group in &mut state.groups {
            group.members.retain(|m| !ids.contains(m));
        }
        Self::record(&mut state, ViewerCommand::RemoveSources(ids.to_vec()));
    }

    fn request_repaint(&self) {
        Self::record(&mut self.state.write(), ViewerCommand::RequestRepaint);
    }

    fn install_bindings(&self, map: &BehaviourMap) {
        let mut state = self.state.write();
        state.bindings.retain(|m| m.name != map.name);
        state.bindings.push(map.clone());
        Self::record(&mut state, ViewerCommand::InstallBindings(map.name.clone()));
    }

    fn remove_bindings(&self, name: &str) {
        let mut state = self.state.write();
        state.bindings.retain(|m| m.name != name);
        Self::record(&mut state, ViewerCommand::RemoveBindings(name.to_string()));
    }

    fn attach_overlay(&self, name: &str) -> OverlayHandle {
        let mut state = self.state.write();
        let handle = OverlayHandle(state.next_overlay);
        state.next_overlay += 1;
        state.overlays.push((handle, name.to_string()));
        state.num_timepoints = 1;
        state.timepoint = 0;
        Self::record(&mut state, ViewerCommand::AttachOverlay(handle));
        handle
    }

    fn detach_overlay(&self, overlay: OverlayHandle) {
        let mut state = self.state.write();
        state.overlays.retain(|(h, _)| *h != overlay);
        for group in &mut state.groups {
            group.overlays.retain(|h| *h != overlay);
            group.active = false;
        }
        state.current_group = None;
        state.num_timepoints = 1;
        state.timepoint = 0;
        Self::record(&mut state, ViewerCommand::DetachOverlay(overlay));
    }

    fn add_overlay_to_group(&self, overlay: OverlayHandle, group: GroupId) {
        let mut state = self.state.write();
        if let Some(g) = state.groups.iter_mut().find(|g| g.id == group)
            && !g.overlays.contains(&overlay)
        {
            g.overlays.push(overlay);
        }
        Self::record(&mut state, ViewerCommand::AddOverlayToGroup(overlay, group));
    }

    fn remove_overlay_from_group(&self, overlay: OverlayHandle, group: GroupId) {
        let mut state = self.state.write();
        if let Some(g) = state.groups.iter_mut().find(|g| g.id == group) {
            g.overlays.retain(|h| *h != overlay);
        }
        Self::record(
            &mut state,
            ViewerCommand::RemoveOverlayFromGroup(overlay, group),
        );
    }

    fn set_timepoints(&self, count: u32, current: u32) {
        let mut state = self.state.write();
        state.num_timepoints = count;
        state.timepoint = current;
        Self::record(&mut state, ViewerCommand::SetTimepoints { count, current });
    }

    fn add_sources_to_group(&self, group: GroupId, ids: &[SourceId]) {
        let mut state = self.state.write();
        if let Some(g) = state.groups.iter_mut().find(|g| g.id == group) {
            for id in ids {
                if !g.members.contains(id) {
                    g.members.push(*id);
                }
            }
        }
        Self::record(
            &mut state,
            ViewerCommand::AddSourcesToGroup(group, ids.to_vec()),
        );
    }

    fn set_group_active(&self, group: GroupId, active: bool) {
        let mut state = self.state.write();
        if let Some(g) = state.groups.iter_mut().find(|g| g.id == group) {
            g.active = active;
        }
        Self::record(&mut state, ViewerCommand::SetGroupActive(group, active));
    }

    fn set_current_group(&self, group: Option<GroupId>) {
        let mut state = self.state.write();
        state.current_group = group;
        Self::record(&mut state, ViewerCommand::SetCurrentGroup(group));
    }

    fn show_message(&self, message: &str) {
        Self::record(
            &mut self.state.write(),
            ViewerCommand::ShowMessage(message.to_string()),
        );
    }

    fn set_cursor(&self, cursor: CursorShape) {
        let mut state = self.state.write();
        state.cursor = cursor;
        Self::record(&mut state, ViewerCommand::SetCursor(cursor));
    }
}
