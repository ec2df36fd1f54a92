// src/core/cache/change.rs

//! Change categories and the lock-free dirty-bit table watchers report into.

use dashmap::DashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// The primary metadata categories whose watchers drive selective refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ChangeCategory {
    IdealState,
    LiveInstance,
    InstanceConfig,
    ResourceConfig,
}

/// One dirty bit per category. Watcher callbacks mark bits without locking;
/// the refresher consumes them with [`DirtyTable::take`].
///
/// `take` swaps the bit to clean and hands back the prior value, so a watcher
/// re-marking the category while its reload is in flight leaves the bit set
/// for the next refresh (set-after-clear semantics).
#[derive(Debug)]
pub struct DirtyTable {
    bits: DashMap<ChangeCategory, bool>,
}

impl DirtyTable {
    /// A fresh table with every category dirty, forcing a whole-world first refresh.
    pub fn new() -> Self {
        let bits = DashMap::new();
        for category in ChangeCategory::iter() {
            bits.insert(category, true);
        }
        Self { bits }
    }

    pub fn mark(&self, category: ChangeCategory) {
        self.bits.insert(category, true);
    }

    pub fn mark_all(&self) {
        for category in ChangeCategory::iter() {
            self.bits.insert(category, true);
        }
    }

    /// Clears the bit and reports whether it was set.
    pub fn take(&self, category: ChangeCategory) -> bool {
        self.bits.insert(category, false).unwrap_or(true)
    }

    pub fn is_dirty(&self, category: ChangeCategory) -> bool {
        self.bits.get(&category).map(|v| *v).unwrap_or(true)
    }

    pub fn any_dirty(&self) -> bool {
        ChangeCategory::iter().any(|c| self.is_dirty(c))
    }
}

impl Default for DirtyTable {
    fn default() -> Self {
        Self::new()
    }
}
