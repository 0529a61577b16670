//! Two-step deletion.
//!
//! Deleting is only possible with a [`Confirmed`] value, and the only way to
//! get one is [`PendingDeletion::confirm`]. A UI shows the pending prompt,
//! and either confirms or drops it.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a deletion does nothing until it is confirmed"]
pub struct PendingDeletion<Id> {
    ids: Vec<Id>,
    prompt: String,
}

impl<Id> PendingDeletion<Id> {
    pub(crate) fn new(ids: Vec<Id>, prompt: String) -> Self {
        Self { ids, prompt }
    }

    /// Question to put to the user, e.g. "Delete 3 people?".
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    pub fn confirm(self) -> Confirmed<Id> {
        Confirmed { ids: self.ids }
    }
}

/// A deletion the user agreed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed<Id> {
    ids: Vec<Id>,
}

impl<Id> Confirmed<Id> {
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    pub fn is_bulk(&self) -> bool {
        self.ids.len() > 1
    }

    pub(crate) fn into_ids(self) -> Vec<Id> {
        self.ids
    }

    /// Drops targets that no longer exist.
    pub(crate) fn retain(&mut self, keep: impl FnMut(&Id) -> bool) {
        self.ids.retain(keep);
    }
}

impl<Id: fmt::Display> fmt::Display for PendingDeletion<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prompt)
    }
}
