use std::collections::BTreeSet;

use crate::source::SourceId;

/// Deterministic set of sources.
///
/// Ids are assigned by the host and may be sparse, so membership is kept in
/// an ordered set rather than indexed storage.
///
/// Ordering contract:
/// - Iteration yields ids in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<SourceId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, source: SourceId) -> bool {
        self.ids.contains(&source)
    }

    /// Inserts `source` into the set.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, source: SourceId) -> bool {
        self.ids.insert(source)
    }

    /// Removes `source` from the set.
    ///
    /// Returns `true` if the set changed.
    pub fn remove(&mut self, source: SourceId) -> bool {
        self.ids.remove(&source)
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.union_in_place(other);
        out
    }

    /// Set difference: `self \ other`.
    pub fn diff(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.diff_in_place(other);
        out
    }

    pub fn union_in_place(&mut self, other: &Self) {
        self.ids.extend(other.ids.iter().copied());
    }

    /// Set difference: `self \ other`.
    pub fn diff_in_place(&mut self, other: &Self) {
        if other.len() < self.len() {
            for id in &other.ids {
                self.ids.remove(id);
            }
        } else {
            self.ids.retain(|id| !other.ids.contains(id));
        }
    }

    /// Keeps only the members for which `keep` returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(SourceId) -> bool,
    {
        self.ids.retain(|id| keep(*id));
    }

    /// Iterates members in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.ids.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<SourceId> {
        self.iter().collect()
    }
}

impl FromIterator<SourceId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = SourceId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl Extend<SourceId> for SelectionSet {
    fn extend<I: IntoIterator<Item = SourceId>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

/// How a batch of candidate sources modifies the selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    /// Replace the selection with the candidates.
    Set,
    /// Union the candidates into the selection.
    Add,
    /// Remove the candidates from the selection.
    Remove,
}

impl SelectionMode {
    pub const ALL: [SelectionMode; 3] = [
        SelectionMode::Set,
        SelectionMode::Add,
        SelectionMode::Remove,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SelectionMode::Set => "SET",
            SelectionMode::Add => "ADD",
            SelectionMode::Remove => "REMOVE",
        }
    }

    /// Mode implied by the modifier keys held when a drag starts.
    ///
    /// Ctrl removes, shift adds, no modifier replaces. Ctrl wins over shift.
    pub fn from_modifiers(shift: bool, ctrl: bool) -> Self {
        if ctrl {
            SelectionMode::Remove
        } else if shift {
            SelectionMode::Add
        } else {
            SelectionMode::Set
        }
    }

    /// Status text shown when a rectangle gesture starts in this mode.
    pub fn status_message(self) -> &'static str {
        match self {
            SelectionMode::Set => "Set Selection",
            SelectionMode::Add => "Add Selection",
            SelectionMode::Remove => "Remove Selection",
        }
    }
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(pub String);

impl std::fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unhandled selection mode {:?}", self.0)
    }
}

impl std::error::Error for ParseModeError {}

impl std::str::FromStr for SelectionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SET" => Ok(SelectionMode::Set),
            "ADD" => Ok(SelectionMode::Add),
            "REMOVE" => Ok(SelectionMode::Remove),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}
