//! Outfit persistence adapter.
//!
//! Maps an in-progress assignment to the record the outfit store expects,
//! and a stored record back to an assignment.
//!
//! | assignment      | record                                 |
//! |-----------------|----------------------------------------|
//! | fixed slots     | `OutfitItems::Slots` (named item refs) |
//! | free selection  | `OutfitItems::List` (item id list)     |
//!
//! Writing is strict: a blank name, an empty assignment, or a fixed
//! assignment with an empty required slot is a validation error. Reading is
//! lenient: ids that no longer resolve to an item are reported and left out.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::models::{validate_name, ClothingItem, NewOutfitRecord, OutfitItems, SlotRefs};
use crate::selection::{ItemRef, MultiSelectAssignment};
use crate::slots::{FixedSlotAssignment, SlotKey};

/// An outfit being composed, in either shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum OutfitAssignment {
    Fixed(FixedSlotAssignment),
    Free(MultiSelectAssignment),
}

impl OutfitAssignment {
    pub fn has_any_item(&self) -> bool {
        match self {
            Self::Fixed(a) => a.has_any_item(),
            Self::Free(a) => a.has_any_item(),
        }
    }

    pub fn item_ids(&self) -> Vec<Uuid> {
        match self {
            Self::Fixed(a) => a.item_ids(),
            Self::Free(a) => a.item_ids(),
        }
    }

    /// Forget a deleted item wherever it appears.
    pub fn remove_item(&mut self, item_id: Uuid) -> bool {
        match self {
            Self::Fixed(a) => a.remove_item(item_id).is_some(),
            Self::Free(a) => a.remove_item(item_id),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::Fixed(a) => a.clear_all(),
            Self::Free(a) => a.clear(),
        }
    }
}

impl From<FixedSlotAssignment> for OutfitAssignment {
    fn from(a: FixedSlotAssignment) -> Self {
        Self::Fixed(a)
    }
}

impl From<MultiSelectAssignment> for OutfitAssignment {
    fn from(a: MultiSelectAssignment) -> Self {
        Self::Free(a)
    }
}

/// Build the store record for `assignment`.
///
/// The name is trimmed; a blank `outfit_type` is stored as uncategorized.
pub fn to_record(
    assignment: &OutfitAssignment,
    name: &str,
    outfit_type: Option<&str>,
) -> Result<NewOutfitRecord> {
    validate_name("Outfit name", name)
        .map_err(|_| Error::Validation("Please give the outfit a name".to_string()))?;

    if !assignment.has_any_item() {
        return Err(Error::Validation(
            "Select at least one item for the outfit".to_string(),
        ));
    }

    let items = match assignment {
        OutfitAssignment::Fixed(slots) => {
            let missing = slots.missing_required();
            if !missing.is_empty() {
                let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                return Err(Error::Validation(format!(
                    "Outfit is missing required slots: {}",
                    names.join(", ")
                )));
            }
            OutfitItems::Slots(slots.to_slot_refs())
        }
        OutfitAssignment::Free(selection) => OutfitItems::List(selection.item_ids()),
    };

    let outfit_type = outfit_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Ok(NewOutfitRecord {
        name: name.trim().to_string(),
        outfit_type,
        season: None,
        items,
    })
}

/// Assignment rebuilt from a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredAssignment {
    pub assignment: OutfitAssignment,
    /// Referenced ids that no longer resolve to an item.
    pub missing: Vec<Uuid>,
}

impl RestoredAssignment {
    pub fn is_intact(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Rebuild an assignment from stored items.
///
/// `resolve` looks an id up among the user's current items. Unresolved ids
/// leave their slot empty (fixed shape) or are dropped from the selection
/// (free shape) and are listed in [`RestoredAssignment::missing`].
pub fn from_record<'a, F>(items: &OutfitItems, resolve: F) -> RestoredAssignment
where
    F: Fn(Uuid) -> Option<&'a ClothingItem>,
{
    let mut missing = Vec::new();

    let assignment = match items {
        OutfitItems::Slots(refs) => {
            let mut slots = FixedSlotAssignment::new();
            for (slot, id) in slot_entries(refs) {
                if resolve(id).is_some() {
                    slots.assign(slot, id);
                } else {
                    missing.push(id);
                }
            }
            OutfitAssignment::Fixed(slots)
        }
        OutfitItems::List(ids) => {
            let mut selection = MultiSelectAssignment::new();
            for id in ids {
                match resolve(*id) {
                    Some(item) if !selection.contains(item.id) => {
                        selection.toggle(ItemRef::from(item));
                    }
                    Some(_) => {}
                    None => missing.push(*id),
                }
            }
            OutfitAssignment::Free(selection)
        }
    };

    if !missing.is_empty() {
        debug!(
            subsystem = "outfits",
            component = "adapter",
            op = "from_record",
            missing_count = missing.len(),
            "Outfit references items that no longer exist"
        );
    }

    RestoredAssignment {
        assignment,
        missing,
    }
}

/// [`from_record`] resolving against a catalog.
pub fn from_record_in(items: &OutfitItems, catalog: &Catalog) -> RestoredAssignment {
    from_record(items, |id| catalog.get(id))
}

fn slot_entries(refs: &SlotRefs) -> impl Iterator<Item = (SlotKey, Uuid)> {
    [
        (SlotKey::Top, refs.top),
        (SlotKey::Bottom, refs.bottom),
        (SlotKey::Shoes, refs.shoes),
        (SlotKey::Accessory, refs.accessory),
    ]
    .into_iter()
    .filter_map(|(slot, id)| id.map(|id| (slot, id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemCategory;
    use chrono::Utc;

    fn item(category: ItemCategory) -> ClothingItem {
        let now = Utc::now();
        ClothingItem {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: format!("{} item", category),
            category,
            color: "black".to_string(),
            image_url: "https://cdn.example.com/x.png".to_string(),
            purchase_link: None,
            is_favorite: false,
            created_at_utc: now,
            updated_at_utc: now,
        }
    }

    fn wardrobe() -> Catalog {
        Catalog::from_items(vec![
            item(ItemCategory::Tops),
            item(ItemCategory::Bottoms),
            item(ItemCategory::Footwear),
            item(ItemCategory::Accessories),
        ])
    }

    fn full_slots(catalog: &Catalog, with_accessory: bool) -> FixedSlotAssignment {
        let mut a = FixedSlotAssignment::new();
        for slot in SlotKey::ALL {
            if slot == SlotKey::Accessory && !with_accessory {
                continue;
            }
            a.assign(slot, catalog.items_for_slot(slot)[0].id);
        }
        a
    }

    #[test]
    fn test_to_record_fixed_without_accessory() {
        let catalog = wardrobe();
        let a = OutfitAssignment::Fixed(full_slots(&catalog, false));
        let record = to_record(&a, "  Monday  ", Some("business")).unwrap();

        assert_eq!(record.name, "Monday");
        assert_eq!(record.outfit_type.as_deref(), Some("business"));
        match record.items {
            OutfitItems::Slots(refs) => {
                assert!(refs.top.is_some() && refs.bottom.is_some() && refs.shoes.is_some());
                assert_eq!(refs.accessory, None);
            }
            other => panic!("Expected slot refs, got {:?}", other),
        }
    }

    #[test]
    fn test_to_record_rejects_blank_name() {
        let catalog = wardrobe();
        let a = OutfitAssignment::Fixed(full_slots(&catalog, true));
        let err = to_record(&a, "   ", None).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_to_record_rejects_empty_assignment() {
        let fixed = OutfitAssignment::Fixed(FixedSlotAssignment::new());
        assert!(matches!(to_record(&fixed, "Empty", None), Err(Error::Validation(_))));

        let free = OutfitAssignment::Free(MultiSelectAssignment::new());
        assert!(matches!(to_record(&free, "Empty", None), Err(Error::Validation(_))));
    }

    #[test]
    fn test_to_record_rejects_partial_fixed_assignment() {
        let catalog = wardrobe();
        let mut slots = FixedSlotAssignment::new();
        slots.assign(SlotKey::Top, catalog.items_for_slot(SlotKey::Top)[0].id);
        slots.assign(SlotKey::Bottom, catalog.items_for_slot(SlotKey::Bottom)[0].id);

        assert!(!slots.is_full());
        assert!(slots.has_any_item());

        let err = to_record(&OutfitAssignment::Fixed(slots), "Half done", None).unwrap_err();
        match err {
            Error::Validation(msg) => assert!(msg.contains("shoes")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_to_record_free_shape_lists_ids() {
        let catalog = wardrobe();
        let mut sel = MultiSelectAssignment::new();
        sel.toggle(&catalog.items()[2]);
        sel.toggle(&catalog.items()[0]);

        let record = to_record(&OutfitAssignment::Free(sel), "Weekend", Some("  ")).unwrap();
        assert_eq!(record.outfit_type, None);
        assert_eq!(
            record.items,
            OutfitItems::List(vec![catalog.items()[2].id, catalog.items()[0].id])
        );
    }

    #[test]
    fn test_roundtrip_fixed() {
        let catalog = wardrobe();
        let original = OutfitAssignment::Fixed(full_slots(&catalog, true));
        let record = to_record(&original, "Full", None).unwrap();

        let restored = from_record_in(&record.items, &catalog);
        assert!(restored.is_intact());
        assert_eq!(restored.assignment, original);
    }

    #[test]
    fn test_roundtrip_free() {
        let catalog = wardrobe();
        let mut sel = MultiSelectAssignment::new();
        for item in catalog.items() {
            sel.toggle(item);
        }
        let original = OutfitAssignment::Free(sel);
        let record = to_record(&original, "Everything", None).unwrap();

        let restored = from_record_in(&record.items, &catalog);
        assert_eq!(restored.assignment, original);
    }

    #[test]
    fn test_roundtrip_tolerates_deleted_item() {
        let mut catalog = wardrobe();
        let original = full_slots(&catalog, true);
        let record = to_record(&OutfitAssignment::Fixed(original.clone()), "Gone", None).unwrap();

        let deleted = original.get(SlotKey::Bottom).unwrap();
        catalog.remove(deleted);

        let restored = from_record_in(&record.items, &catalog);
        assert_eq!(restored.missing, vec![deleted]);
        match restored.assignment {
            OutfitAssignment::Fixed(slots) => {
                assert_eq!(slots.get(SlotKey::Bottom), None);
                for slot in [SlotKey::Top, SlotKey::Shoes, SlotKey::Accessory] {
                    assert_eq!(slots.get(slot), original.get(slot));
                }
            }
            other => panic!("Expected fixed assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_from_record_free_drops_unknown_and_duplicate_ids() {
        let catalog = wardrobe();
        let known = catalog.items()[0].id;
        let unknown = Uuid::new_v4();
        let items = OutfitItems::List(vec![known, unknown, known]);

        let restored = from_record_in(&items, &catalog);
        assert_eq!(restored.missing, vec![unknown]);
        assert_eq!(restored.assignment.item_ids(), vec![known]);
    }

    #[test]
    fn test_outfit_assignment_remove_item() {
        let catalog = wardrobe();
        let mut a = OutfitAssignment::Fixed(full_slots(&catalog, false));
        let top = catalog.items_for_slot(SlotKey::Top)[0].id;
        assert!(a.remove_item(top));
        assert!(!a.item_ids().contains(&top));
        a.clear();
        assert!(!a.has_any_item());
    }
}
