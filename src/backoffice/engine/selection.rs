//! Selection tracker: the ids checked for bulk actions.
//!
//! Pure bookkeeping. It never touches the record collection, and bulk actions
//! resolve ids against the collection at the moment they run.

use crate::model::Resource;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<Id: Ord> {
    ids: BTreeSet<Id>,
    /// What was selected before the last select-all, so a second select-all
    /// on the same rows can put it back.
    stash: Option<BTreeSet<Id>>,
}

impl<Id: Ord> Default for Selection<Id> {
    fn default() -> Self {
        Self {
            ids: BTreeSet::new(),
            stash: None,
        }
    }
}

impl<Id: Ord + Clone> Selection<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: Id) {
        self.stash = None;
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Selects exactly the visible rows, or undoes that.
    ///
    /// Not additive: the first call selects every visible id; a second call on
    /// the same visible rows restores whatever was selected before the first.
    /// When all visible rows are already selected, the call clears them.
    pub fn select_all(&mut self, visible: &[Id]) {
        let visible_set: BTreeSet<Id> = visible.iter().cloned().collect();

        if let Some(previous) = self.stash.take() {
            if self.ids == visible_set {
                self.ids = previous;
                return;
            }
        }

        if !visible_set.is_empty() && visible_set.is_subset(&self.ids) {
            for id in &visible_set {
                self.ids.remove(id);
            }
            return;
        }

        let previous = std::mem::replace(&mut self.ids, visible_set);
        self.stash = Some(previous);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.stash = None;
    }

    /// Drops the given ids, e.g. after they were deleted.
    pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a Id>)
    where
        Id: 'a,
    {
        self.stash = None;
        for id in ids {
            self.ids.remove(id);
        }
    }

    /// Keeps only ids for which `exists` holds.
    pub fn retain(&mut self, mut exists: impl FnMut(&Id) -> bool) {
        let before = self.ids.len();
        self.ids.retain(|id| exists(id));
        if self.ids.len() != before {
            self.stash = None;
        }
    }

    pub fn is_selected(&self, id: &Id) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.ids.iter()
    }

    /// True when every one of `visible` is selected (and there is at least one).
    pub fn covers(&self, visible: &[Id]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id))
    }

    /// Resolves the selection against `records`, in collection order.
    ///
    /// Ids whose record has disappeared are skipped.
    pub fn selected_records<R>(&self, records: &[R]) -> Vec<R>
    where
        R: Resource<Id = Id>,
    {
        records
            .iter()
            .filter(|r| self.ids.contains(&r.id()))
            .cloned()
            .collect()
    }
}
