//! Patient selection: the subset of records an analysis runs over

use crate::patient::Patient;
use std::collections::HashSet;

/// Set of selected patient ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every patient in `patients`
    pub fn all(patients: &[Patient]) -> Self {
        Self { ids: patients.iter().map(|p| p.id.clone()).collect() }
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { ids: ids.into_iter().map(Into::into).collect() }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Flip one id in or out of the selection
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// Select everyone, or clear when the selection is already as large as
    /// `patients`.
    pub fn toggle_all(&mut self, patients: &[Patient]) {
        if self.ids.len() == patients.len() {
            self.ids.clear();
        } else {
            *self = Self::all(patients);
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected patients in their original order
    pub fn apply(&self, patients: &[Patient]) -> Vec<Patient> {
        patients.iter().filter(|p| self.ids.contains(&p.id)).cloned().collect()
    }
}
