//! Coarse area-selection checklist.
//!
//! The checklist records which kinds of facility the designer intends to
//! include. It is a plain set: toggling adds an absent id and removes a
//! present one. It is independent of the [`AreaRegistry`](crate::areas::AreaRegistry);
//! checking an item never creates a draggable volume.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One checklist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: &'static str,
    pub label: &'static str,
}

/// Items offered by the designer's checklist, in display order.
pub const CHECKLIST: [ChecklistItem; 11] = [
    ChecklistItem { id: "crew_cubicles", label: "Crew cubicles" },
    ChecklistItem { id: "waste_management", label: "Waste management" },
    ChecklistItem { id: "thermal_control", label: "Thermal control" },
    ChecklistItem { id: "life_support", label: "Life support" },
    ChecklistItem { id: "communications", label: "Communications" },
    ChecklistItem { id: "power", label: "Power" },
    ChecklistItem { id: "storage", label: "Storage" },
    ChecklistItem { id: "food_preparation", label: "Food preparation" },
    ChecklistItem { id: "medical_care", label: "Medical care" },
    ChecklistItem { id: "rest", label: "Rest" },
    ChecklistItem { id: "exercise", label: "Exercise" },
];

pub fn is_catalog_item(id: &str) -> bool {
    CHECKLIST.iter().any(|item| item.id == id)
}

pub fn checklist_item(id: &str) -> Option<&'static ChecklistItem> {
    CHECKLIST.iter().find(|item| item.id == id)
}

/// Set of checked items. Iteration order is sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSelection {
    members: BTreeSet<String>,
}

impl AreaSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present.
    ///
    /// Returns `true` when `id` is a member afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.members.remove(id) {
            false
        } else {
            self.members.insert(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Members that are not part of [`CHECKLIST`].
    pub fn unknown(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|id| !is_catalog_item(id))
    }
}

impl<S: AsRef<str>> FromIterator<S> for AreaSelection {
    /// Toggles every id in turn, so duplicates cancel out.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for id in iter {
            selection.toggle(id.as_ref());
        }
        selection
    }
}
