//! Minimal add/remove plans for reconciling a persisted set to a desired one.

use std::collections::BTreeSet;

/// `to_remove` is `current \ desired`, `to_add` is `desired \ current`.
/// Members of both sets appear in neither list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDiff<T> {
    pub to_add: Vec<T>,
    pub to_remove: Vec<T>,
}

impl<T: Ord + Clone> SetDiff<T> {
    /// Duplicates on either side are ignored. Output is sorted.
    #[must_use]
    pub fn between(current: &[T], desired: &[T]) -> Self {
        let current: BTreeSet<&T> = current.iter().collect();
        let desired: BTreeSet<&T> = desired.iter().collect();

        Self {
            to_add: desired.difference(&current).map(|v| (*v).clone()).collect(),
            to_remove: current.difference(&desired).map(|v| (*v).clone()).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}
