use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use scene::selection::{SelectionMode, SelectionSet};
use scene::{SourceId, has_voxel_data};
use tracing::{debug, error};

use crate::error::SelectionError;
use crate::host::{Viewer, ViewerStateChange};
use crate::listeners::{Listeners, SelectedSourcesListener};

/// Owns the selection set and applies SET / ADD / REMOVE transactions to it.
///
/// Notes:
/// - A transaction (mutation plus listener dispatch) runs under one lock, so
///   concurrent transactions serialize and nobody observes a half-applied one.
/// - The lock is reentrant: a listener may call [`Self::get`] from inside a
///   callback. Modifying the selection from a callback is not supported.
/// - Every successful transaction leaves only visible sources in the set.
pub struct SelectionCoordinator<V: Viewer + ?Sized> {
    viewer: Arc<V>,
    selection: ReentrantMutex<RefCell<SelectionSet>>,
    listeners: Listeners<dyn SelectedSourcesListener>,
}

impl<V: Viewer + ?Sized> std::fmt::Debug for SelectionCoordinator<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionCoordinator")
            .field("selection", &self.get())
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl<V: Viewer + ?Sized> SelectionCoordinator<V> {
    pub fn new(viewer: Arc<V>) -> Self {
        Self {
            viewer,
            selection: ReentrantMutex::new(RefCell::new(SelectionSet::new())),
            listeners: Listeners::new(),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn SelectedSourcesListener>) {
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn SelectedSourcesListener>) -> bool {
        self.listeners.remove(listener)
    }

    /// Copy of the current selection.
    pub fn get(&self) -> SelectionSet {
        self.selection.lock().borrow().clone()
    }

    /// Applies one transaction.
    ///
    /// Notes:
    /// - SET and ADD are all-or-nothing: if any candidate is hidden the batch is
    ///   rejected, logged and returned as [`SelectionError::VisibilityViolation`].
    ///   Otherwise candidates without voxel data are dropped before mutating.
    /// - REMOVE removes the candidates as given, without the visibility or voxel
    ///   data checks, and reports them unchanged as the delta. Ids that were not
    ///   selected still appear in the delta.
    /// - Listeners are notified when `candidates` is non-empty, or when an empty
    ///   SET clears a non-empty selection.
    /// - A repaint is requested after every applied transaction.
    pub fn apply_modification(
        &self,
        candidates: &SelectionSet,
        mode: SelectionMode,
        origin: &str,
    ) -> Result<(), SelectionError> {
        let guard = self.selection.lock();
        let initial_size = guard.borrow().len();

        let delta = match mode {
            SelectionMode::Set | SelectionMode::Add => {
                let hidden: Vec<SourceId> = candidates
                    .iter()
                    .filter(|&id| !self.viewer.is_visible(id))
                    .collect();
                if !hidden.is_empty() {
                    error!(
                        "{mode} from {origin} rejected: {} of {} sources not visible ({hidden:?})",
                        hidden.len(),
                        candidates.len()
                    );
                    return Err(SelectionError::VisibilityViolation { hidden });
                }
                let timepoint = self.viewer.current_timepoint();
                let mut sanitized = candidates.clone();
                sanitized.retain(|id| has_voxel_data(&*self.viewer, id, timepoint));

                let mut selection = guard.borrow_mut();
                if mode == SelectionMode::Set {
                    selection.clear();
                }
                selection.union_in_place(&sanitized);
                sanitized
            }
            SelectionMode::Remove => {
                guard.borrow_mut().diff_in_place(candidates);
                candidates.clone()
            }
        };

        let current = guard.borrow().clone();
        debug!(
            "{mode} from {origin}: {} candidates, delta {}, selection {} -> {}",
            candidates.len(),
            delta.len(),
            initial_size,
            current.len()
        );

        let notify =
            !candidates.is_empty() || (mode == SelectionMode::Set && initial_size != 0);
        if notify {
            for listener in self.listeners.snapshot() {
                listener.selection_updated(&current, origin);
                listener.last_event(&delta, mode, origin);
            }
        }
        drop(guard);

        self.viewer.request_repaint();
        Ok(())
    }

    /// Same as [`Self::apply_modification`] with the mode given by name.
    pub fn apply_modification_str(
        &self,
        candidates: &SelectionSet,
        mode: &str,
        origin: &str,
    ) -> Result<(), SelectionError> {
        let mode = match mode.parse::<SelectionMode>() {
            Ok(mode) => mode,
            Err(err) => {
                error!("{err} from {origin}; selection left unchanged");
                return Err(SelectionError::InvalidMode(err.0));
            }
        };
        self.apply_modification(candidates, mode, origin)
    }

    pub fn add<I>(&self, sources: I, origin: &str) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = SourceId>,
    {
        let candidates: SelectionSet = sources.into_iter().collect();
        self.apply_modification(&candidates, SelectionMode::Add, origin)
    }

    pub fn remove<I>(&self, sources: I, origin: &str) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = SourceId>,
    {
        let candidates: SelectionSet = sources.into_iter().collect();
        self.apply_modification(&candidates, SelectionMode::Remove, origin)
    }

    pub fn clear(&self, origin: &str) -> Result<(), SelectionError> {
        self.apply_modification(&SelectionSet::new(), SelectionMode::Set, origin)
    }

    /// Adds every visible source; pseudo-sources are dropped by sanitization.
    pub fn select_all_visible(&self, origin: &str) -> Result<(), SelectionError> {
        self.add(self.viewer.visible_sources(), origin)
    }

    /// Removes selected sources that are no longer visible.
    ///
    /// Runs as a regular REMOVE tagged with the change name, so listeners see
    /// it like any other transaction. Other changes are ignored.
    pub fn prune(&self, change: ViewerStateChange) {
        if !change.affects_visible_set() {
            return;
        }
        let guard = self.selection.lock();
        let mut leftovers = guard.borrow().clone();
        leftovers.retain(|id| !self.viewer.is_visible(id));
        if leftovers.is_empty() {
            return;
        }
        debug!("pruning {} hidden sources after {change}", leftovers.len());
        // REMOVE never fails.
        let _ = self.apply_modification(&leftovers, SelectionMode::Remove, change.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionCoordinator;
    use crate::error::SelectionError;
    use crate::host::ViewerStateChange;
    use crate::listeners::SelectedSourcesListener;
    use crate::memory::InMemoryViewer;
    use foundation::math::Affine3;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use scene::SourceId;
    use scene::selection::{SelectionMode, SelectionSet};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Updated(Vec<SourceId>, String),
        Event(Vec<SourceId>, SelectionMode, String),
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Seen>>);

    impl Recorder {
        fn take(&self) -> Vec<Seen> {
            std::mem::take(&mut *self.0.lock())
        }
    }

    impl SelectedSourcesListener for Recorder {
        fn selection_updated(&self, selection: &SelectionSet, origin: &str) {
            self.0
                .lock()
                .push(Seen::Updated(selection.to_vec(), origin.to_string()));
        }

        fn last_event(&self, delta: &SelectionSet, mode: SelectionMode, origin: &str) {
            self.0
                .lock()
                .push(Seen::Event(delta.to_vec(), mode, origin.to_string()));
        }
    }

    struct Fixture {
        viewer: Arc<InMemoryViewer>,
        coordinator: SelectionCoordinator<InMemoryViewer>,
        recorder: Arc<Recorder>,
        s1: SourceId,
        s2: SourceId,
        hidden: SourceId,
        pseudo: SourceId,
    }

    fn fixture() -> Fixture {
        let viewer = Arc::new(InMemoryViewer::new((640, 480), 1));
        let s1 = viewer.add_source("s1", [8, 8, 8], Affine3::identity());
        let s2 = viewer.add_source("s2", [8, 8, 8], Affine3::identity());
        let hidden = viewer.add_source("s3", [8, 8, 8], Affine3::identity());
        viewer.set_visible(hidden, false);
        let pseudo = viewer.add_pseudo_source("decoration");

        let coordinator = SelectionCoordinator::new(viewer.clone());
        let recorder = Arc::new(Recorder::default());
        coordinator.add_listener(recorder.clone());
        Fixture {
            viewer,
            coordinator,
            recorder,
            s1,
            s2,
            hidden,
            pseudo,
        }
    }

    fn set(ids: &[SourceId]) -> SelectionSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn set_replaces_and_drops_pseudo_sources() {
        let f = fixture();
        f.coordinator.add([f.s1], "t").expect("add");
        f.recorder.take();

        f.coordinator
            .apply_modification(&set(&[f.s2, f.pseudo]), SelectionMode::Set, "t")
            .expect("set");

        assert_eq!(f.coordinator.get().to_vec(), vec![f.s2]);
        assert_eq!(
            f.recorder.take(),
            vec![
                Seen::Updated(vec![f.s2], "t".into()),
                Seen::Event(vec![f.s2], SelectionMode::Set, "t".into()),
            ]
        );
    }

    #[test]
    fn hidden_candidate_rejects_whole_batch() {
        let f = fixture();
        let err = f
            .coordinator
            .apply_modification(&set(&[f.s1, f.hidden]), SelectionMode::Set, "t")
            .expect_err("rejected");

        assert_eq!(
            err,
            SelectionError::VisibilityViolation {
                hidden: vec![f.hidden],
            }
        );
        assert!(f.coordinator.get().is_empty());
        assert!(f.recorder.take().is_empty());
        assert_eq!(f.viewer.repaint_count(), 0);
    }

    #[test]
    fn remove_skips_visibility_check() {
        let f = fixture();
        f.coordinator.add([f.s1], "t").expect("add");
        f.recorder.take();

        f.coordinator.remove([f.hidden, f.s1], "t").expect("remove");

        assert!(f.coordinator.get().is_empty());
        assert_eq!(
            f.recorder.take()[1],
            Seen::Event(vec![f.s1, f.hidden], SelectionMode::Remove, "t".into())
        );
    }

    #[test]
    fn unknown_mode_string_is_rejected_silently() {
        let f = fixture();
        let err = f
            .coordinator
            .apply_modification_str(&set(&[f.s1]), "TOGGLE", "t")
            .expect_err("invalid");
        assert_eq!(err, SelectionError::InvalidMode("TOGGLE".into()));
        assert!(f.coordinator.get().is_empty());
        assert!(f.recorder.take().is_empty());

        f.coordinator
            .apply_modification_str(&set(&[f.s1]), "ADD", "t")
            .expect("add");
        assert_eq!(f.coordinator.get().to_vec(), vec![f.s1]);
    }

    #[test]
    fn every_applied_transaction_requests_a_repaint() {
        let f = fixture();
        f.coordinator.add(Vec::new(), "t").expect("empty add");
        f.coordinator.add([f.s1], "t").expect("add");
        f.coordinator.clear("t").expect("clear");
        assert_eq!(f.viewer.repaint_count(), 3);
    }

    #[test]
    fn select_all_visible_skips_hidden_and_pseudo_sources() {
        let f = fixture();
        f.coordinator.select_all_visible("SelectorOverlay").expect("all");
        assert_eq!(f.coordinator.get().to_vec(), vec![f.s1, f.s2]);
    }

    #[test]
    fn prune_ignores_unrelated_changes() {
        let f = fixture();
        f.coordinator.add([f.s1], "t").expect("add");
        f.viewer.set_visible(f.s1, false);
        f.recorder.take();

        f.coordinator.prune(ViewerStateChange::ViewerTransformChanged);
        assert_eq!(f.coordinator.get().to_vec(), vec![f.s1]);

        f.coordinator.prune(ViewerStateChange::SourceCountChanged);
        assert!(f.coordinator.get().is_empty());
        assert_eq!(
            f.recorder.take(),
            vec![
                Seen::Updated(vec![], "SOURCE_COUNT_CHANGED".into()),
                Seen::Event(
                    vec![f.s1],
                    SelectionMode::Remove,
                    "SOURCE_COUNT_CHANGED".into()
                ),
            ]
        );
    }

    struct Reader {
        coordinator: Arc<SelectionCoordinator<InMemoryViewer>>,
        seen: Mutex<Vec<usize>>,
    }

    impl SelectedSourcesListener for Reader {
        fn selection_updated(&self, _selection: &SelectionSet, _origin: &str) {
            self.seen.lock().push(self.coordinator.get().len());
        }

        fn last_event(&self, _delta: &SelectionSet, _mode: SelectionMode, _origin: &str) {}
    }

    #[test]
    fn listener_can_read_selection_during_callback() {
        let viewer = Arc::new(InMemoryViewer::new((10, 10), 1));
        let a = viewer.add_source("a", [1, 1, 1], Affine3::identity());
        let coordinator = Arc::new(SelectionCoordinator::new(viewer));
        let reader = Arc::new(Reader {
            coordinator: coordinator.clone(),
            seen: Mutex::new(Vec::new()),
        });
        coordinator.add_listener(reader.clone());

        coordinator.add([a], "t").expect("add");
        assert_eq!(*reader.seen.lock(), vec![1]);
    }
}
