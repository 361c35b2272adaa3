//! Selection of records for batch operations, tracked by uuid

use crate::record::Record;
use std::collections::BTreeSet;

/// The set of selected record identities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of one record
    pub fn toggle(&mut self, uuid: &str) {
        if !self.ids.remove(uuid) {
            self.ids.insert(uuid.to_string());
        }
    }

    /// Clear when everything visible is already selected, otherwise select
    /// exactly the visible rows (dropping any selection outside them).
    pub fn toggle_all(&mut self, visible: &[&Record]) {
        if self.ids.len() == visible.len() {
            self.ids.clear();
        } else {
            self.ids = visible.iter().map(|r| r.uuid.clone()).collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.ids.contains(uuid)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Selected records, in collection order
    pub fn selected<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|r| self.contains(&r.uuid)).collect()
    }
}

impl FromIterator<String> for Selection {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
