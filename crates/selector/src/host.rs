use foundation::math::Affine3;
use scene::SourceCatalog;
use scene::SourceId;
use scene::projection::ViewContext;

/// A display group of the host viewer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub u32);

/// Handle to an overlay decoration attached to the viewer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CursorShape {
    Default,
    Crosshair,
}

/// Kinds of state change the host reports to the selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ViewerStateChange {
    SourceCountChanged,
    VisibilityChanged,
    CurrentTimepointChanged,
    ViewerTransformChanged,
    GroupChanged,
    Other,
}

impl ViewerStateChange {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewerStateChange::SourceCountChanged => "SOURCE_COUNT_CHANGED",
            ViewerStateChange::VisibilityChanged => "VISIBILITY_CHANGED",
            ViewerStateChange::CurrentTimepointChanged => "TIMEPOINT_CHANGED",
            ViewerStateChange::ViewerTransformChanged => "VIEWER_TRANSFORM_CHANGED",
            ViewerStateChange::GroupChanged => "GROUP_CHANGED",
            ViewerStateChange::Other => "OTHER",
        }
    }

    /// True for changes that can make a selected source invisible.
    pub fn affects_visible_set(self) -> bool {
        matches!(
            self,
            ViewerStateChange::SourceCountChanged | ViewerStateChange::VisibilityChanged
        )
    }

    /// True for changes after which the tracked sources must be re-derived.
    pub fn affects_tracked_sources(self) -> bool {
        self.affects_visible_set() || self == ViewerStateChange::CurrentTimepointChanged
    }
}

impl std::fmt::Display for ViewerStateChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a binding does when its trigger fires.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SelectorAction {
    Toggle,
    SetSelection,
    AddSelection,
    RemoveSelection,
    SelectAllVisible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Trigger in the host's syntax, e.g. `"shift button1"`.
    pub trigger: String,
    pub action: SelectorAction,
}

/// A named set of bindings installed into the host's input dispatch.
///
/// `blocked_contexts` names input contexts (such as `"navigation"`) the host
/// must not dispatch to while this map is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviourMap {
    pub name: String,
    pub bindings: Vec<Binding>,
    pub blocked_contexts: Vec<String>,
}

impl BehaviourMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
            blocked_contexts: Vec::new(),
        }
    }

    pub fn bind(mut self, trigger: impl Into<String>, action: SelectorAction) -> Self {
        self.bindings.push(Binding {
            trigger: trigger.into(),
            action,
        });
        self
    }

    pub fn block(mut self, context: impl Into<String>) -> Self {
        self.blocked_contexts.push(context.into());
        self
    }

    pub fn action_for(&self, trigger: &str) -> Option<SelectorAction> {
        self.bindings
            .iter()
            .find(|b| b.trigger == trigger)
            .map(|b| b.action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub members: Vec<SourceId>,
    pub active: bool,
}

/// Host bookkeeping that attaching or detaching an overlay may perturb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerSnapshot {
    pub num_timepoints: u32,
    pub current_timepoint: u32,
    pub current_group: Option<GroupId>,
    pub groups: Vec<GroupSnapshot>,
}

/// The viewer the selector is attached to.
///
/// All methods take `&self`; hosts use interior mutability and may be called
/// from both the input and the render thread.
pub trait Viewer: SourceCatalog + Send + Sync {
    // Queries.

    /// Sources currently displayed, in display order.
    fn visible_sources(&self) -> Vec<SourceId>;

    fn is_visible(&self, id: SourceId) -> bool;

    /// World-to-screen transform.
    fn viewer_transform(&self) -> Affine3;

    fn current_timepoint(&self) -> u32;

    fn num_timepoints(&self) -> u32;

    /// Canvas width and height in pixels.
    fn canvas_size(&self) -> (u32, u32);

    fn groups(&self) -> Vec<GroupId>;

    fn snapshot(&self) -> ViewerSnapshot;

    // Commands.

    fn remove_sources(&self, ids: &[SourceId]);

    fn request_repaint(&self);

    fn install_bindings(&self, map: &BehaviourMap);

    fn remove_bindings(&self, name: &str);

    fn attach_overlay(&self, name: &str) -> OverlayHandle;

    fn detach_overlay(&self, overlay: OverlayHandle);

    fn add_overlay_to_group(&self, overlay: OverlayHandle, group: GroupId);

    fn remove_overlay_from_group(&self, overlay: OverlayHandle, group: GroupId);

    fn set_timepoints(&self, count: u32, current: u32);

    fn add_sources_to_group(&self, group: GroupId, ids: &[SourceId]);

    fn set_group_active(&self, group: GroupId, active: bool);

    fn set_current_group(&self, group: Option<GroupId>);

    fn show_message(&self, message: &str);

    fn set_cursor(&self, cursor: CursorShape);

    /// Camera state for projecting source boxes right now.
    fn view_context(&self) -> ViewContext {
        ViewContext::new(
            self.viewer_transform(),
            self.current_timepoint(),
            self.canvas_size(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{BehaviourMap, SelectorAction, ViewerStateChange};

    #[test]
    fn change_tags_are_upper_snake() {
        assert_eq!(ViewerStateChange::VisibilityChanged.to_string(), "VISIBILITY_CHANGED");
        assert_eq!(
            ViewerStateChange::SourceCountChanged.to_string(),
            "SOURCE_COUNT_CHANGED"
        );
    }

    #[test]
    fn timepoint_change_refreshes_but_does_not_prune() {
        let change = ViewerStateChange::CurrentTimepointChanged;
        assert!(change.affects_tracked_sources());
        assert!(!change.affects_visible_set());
        assert!(!ViewerStateChange::ViewerTransformChanged.affects_tracked_sources());
    }

    #[test]
    fn behaviour_map_looks_up_actions_by_trigger() {
        let map = BehaviourMap::new("m")
            .bind("button1", SelectorAction::SetSelection)
            .bind("ctrl A", SelectorAction::SelectAllVisible)
            .block("navigation");
        assert_eq!(map.action_for("ctrl A"), Some(SelectorAction::SelectAllVisible));
        assert_eq!(map.action_for("E"), None);
        assert_eq!(map.blocked_contexts, vec!["navigation".to_string()]);
    }
}
