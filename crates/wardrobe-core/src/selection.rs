//! Free multi-select outfit assignment.
//!
//! An ordered set of item references with no slot labels. Toggling is the
//! only way to change membership: selecting a selected item deselects it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ClothingItem, ItemCategory};

/// Weak reference to a selected item: its id plus the category it is
/// grouped under for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: Uuid,
    pub category: ItemCategory,
}

impl From<&ClothingItem> for ItemRef {
    fn from(item: &ClothingItem) -> Self {
        Self {
            id: item.id,
            category: item.category.clone(),
        }
    }
}

/// Set of selected items keyed by id, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSelectAssignment {
    selected: Vec<ItemRef>,
}

impl MultiSelectAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the item if it is selected, otherwise append it.
    ///
    /// Returns `true` when the item is selected after the call.
    pub fn toggle(&mut self, item: impl Into<ItemRef>) -> bool {
        let item = item.into();
        match self.selected.iter().position(|r| r.id == item.id) {
            Some(pos) => {
                self.selected.remove(pos);
                false
            }
            None => {
                self.selected.push(item);
                true
            }
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.selected.iter().any(|r| r.id == id)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn has_any_item(&self) -> bool {
        !self.is_empty()
    }

    pub fn selected(&self) -> &[ItemRef] {
        &self.selected
    }

    /// Selected ids in selection order.
    pub fn item_ids(&self) -> Vec<Uuid> {
        self.selected.iter().map(|r| r.id).collect()
    }

    /// Drop `id` from the selection without toggling it back in later.
    pub fn remove_item(&mut self, id: Uuid) -> bool {
        let before = self.selected.len();
        self.selected.retain(|r| r.id != id);
        self.selected.len() != before
    }

    /// Selected ids grouped by category; each group keeps selection order.
    pub fn group_by_category(&self) -> BTreeMap<ItemCategory, Vec<Uuid>> {
        let mut groups: BTreeMap<ItemCategory, Vec<Uuid>> = BTreeMap::new();
        for r in &self.selected {
            groups.entry(r.category.clone()).or_default().push(r.id);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(category: ItemCategory) -> ItemRef {
        ItemRef {
            id: Uuid::new_v4(),
            category,
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut sel = MultiSelectAssignment::new();
        let item = r(ItemCategory::Tops);

        assert!(sel.toggle(item.clone()));
        assert!(sel.contains(item.id));
        assert!(!sel.toggle(item.clone()));
        assert!(!sel.contains(item.id));
    }

    #[test]
    fn test_toggle_twice_is_involution() {
        let mut sel = MultiSelectAssignment::new();
        sel.toggle(r(ItemCategory::Tops));
        sel.toggle(r(ItemCategory::Footwear));
        let original = sel.clone();

        let item = r(ItemCategory::Bottoms);
        sel.toggle(item.clone());
        sel.toggle(item);
        assert_eq!(sel, original);

        let existing = original.selected()[0].clone();
        sel.toggle(existing.clone());
        sel.toggle(existing);
        assert_eq!(sel.item_ids().len(), original.len());
        assert!(sel.contains(original.selected()[0].id));
    }

    #[test]
    fn test_no_duplicate_ids() {
        let mut sel = MultiSelectAssignment::new();
        let item = r(ItemCategory::Tops);
        sel.toggle(item.clone());
        sel.toggle(r(ItemCategory::Tops));
        sel.toggle(item.clone());
        sel.toggle(item.clone());

        let ids = sel.item_ids();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_group_by_category_preserves_selection_order() {
        let mut sel = MultiSelectAssignment::new();
        let shirt = r(ItemCategory::Tops);
        let boots = r(ItemCategory::Footwear);
        let tee = r(ItemCategory::Tops);
        sel.toggle(shirt.clone());
        sel.toggle(boots.clone());
        sel.toggle(tee.clone());

        let groups = sel.group_by_category();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&ItemCategory::Tops], vec![shirt.id, tee.id]);
        assert_eq!(groups[&ItemCategory::Footwear], vec![boots.id]);
    }

    #[test]
    fn test_clear() {
        let mut sel = MultiSelectAssignment::new();
        sel.toggle(r(ItemCategory::Tops));
        sel.clear();
        assert!(sel.is_empty());
        assert!(!sel.has_any_item());
        assert!(sel.group_by_category().is_empty());
    }

    #[test]
    fn test_remove_item() {
        let mut sel = MultiSelectAssignment::new();
        let item = r(ItemCategory::Accessories);
        sel.toggle(item.clone());
        assert!(sel.remove_item(item.id));
        assert!(!sel.remove_item(item.id));
    }
}
