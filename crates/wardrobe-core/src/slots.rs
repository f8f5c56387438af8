//! Fixed-slot outfit assignment.
//!
//! Four named slots, each holding zero or one item id. Top, bottom and
//! shoes are required for saving; the accessory is optional. The assignment
//! only refers to items by id and must keep working when an item vanishes
//! from the catalog.
//!
//! Partial state is normal while editing. The save path checks
//! [`FixedSlotAssignment::is_full`]; "is there anything to show or clear"
//! checks [`FixedSlotAssignment::has_any_item`]. The two are kept apart on
//! purpose.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{ItemCategory, SlotRefs};

/// A named position in the fixed outfit template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKey {
    Top,
    Bottom,
    Shoes,
    Accessory,
}

impl SlotKey {
    /// Every slot, in display order.
    pub const ALL: [SlotKey; 4] = [Self::Top, Self::Bottom, Self::Shoes, Self::Accessory];

    /// Slots that must be filled before the outfit can be saved.
    pub const REQUIRED: [SlotKey; 3] = [Self::Top, Self::Bottom, Self::Shoes];

    pub fn is_required(self) -> bool {
        !matches!(self, Self::Accessory)
    }

    /// Item category the builder offers for this slot.
    pub fn compatible_category(self) -> ItemCategory {
        match self {
            Self::Top => ItemCategory::Tops,
            Self::Bottom => ItemCategory::Bottoms,
            Self::Shoes => ItemCategory::Footwear,
            Self::Accessory => ItemCategory::Accessories,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Bottom => 1,
            Self::Shoes => 2,
            Self::Accessory => 3,
        }
    }
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
            Self::Shoes => write!(f, "shoes"),
            Self::Accessory => write!(f, "accessory"),
        }
    }
}

impl std::str::FromStr for SlotKey {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "shoes" => Ok(Self::Shoes),
            "accessory" => Ok(Self::Accessory),
            _ => Err(Error::InvalidInput(format!("Unknown outfit slot: {}", s))),
        }
    }
}

/// Slot → optional item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedSlotAssignment {
    slots: [Option<Uuid>; 4],
}

impl FixedSlotAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `item_id` into `slot`, replacing any previous occupant.
    ///
    /// If the item currently sits in a different slot it is moved, so an id
    /// is never held twice. Returns the id that was displaced from `slot`.
    pub fn assign(&mut self, slot: SlotKey, item_id: Uuid) -> Option<Uuid> {
        for other in self.slots.iter_mut() {
            if *other == Some(item_id) {
                *other = None;
            }
        }
        self.slots[slot.index()].replace(item_id)
    }

    /// Empty one slot, returning what it held.
    pub fn clear(&mut self, slot: SlotKey) -> Option<Uuid> {
        self.slots[slot.index()].take()
    }

    pub fn clear_all(&mut self) {
        self.slots = [None; 4];
    }

    pub fn get(&self, slot: SlotKey) -> Option<Uuid> {
        self.slots[slot.index()]
    }

    /// True iff every required slot is occupied; the accessory is ignored.
    pub fn is_full(&self) -> bool {
        SlotKey::REQUIRED.iter().all(|s| self.get(*s).is_some())
    }

    /// True iff at least one slot (required or not) is occupied.
    pub fn has_any_item(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Required slots that are still empty, in display order.
    pub fn missing_required(&self) -> Vec<SlotKey> {
        SlotKey::REQUIRED
            .into_iter()
            .filter(|s| self.get(*s).is_none())
            .collect()
    }

    /// Occupied slots in display order.
    pub fn occupied(&self) -> impl Iterator<Item = (SlotKey, Uuid)> + '_ {
        SlotKey::ALL
            .into_iter()
            .filter_map(|s| self.get(s).map(|id| (s, id)))
    }

    pub fn item_ids(&self) -> Vec<Uuid> {
        self.occupied().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_any_item()
    }

    /// Clear whichever slot holds `item_id` (e.g. after the item was
    /// deleted). Returns the slot that was cleared.
    pub fn remove_item(&mut self, item_id: Uuid) -> Option<SlotKey> {
        let slot = self.occupied().find(|(_, id)| *id == item_id)?.0;
        self.clear(slot);
        Some(slot)
    }

    /// Stored slot references for this assignment.
    pub fn to_slot_refs(&self) -> SlotRefs {
        SlotRefs {
            top: self.get(SlotKey::Top),
            bottom: self.get(SlotKey::Bottom),
            shoes: self.get(SlotKey::Shoes),
            accessory: self.get(SlotKey::Accessory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> (FixedSlotAssignment, [Uuid; 3]) {
        let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let mut a = FixedSlotAssignment::new();
        a.assign(SlotKey::Top, ids[0]);
        a.assign(SlotKey::Bottom, ids[1]);
        a.assign(SlotKey::Shoes, ids[2]);
        (a, ids)
    }

    #[test]
    fn test_new_assignment_is_empty() {
        let a = FixedSlotAssignment::new();
        assert!(!a.has_any_item());
        assert!(!a.is_full());
        assert_eq!(a.missing_required(), SlotKey::REQUIRED.to_vec());
    }

    #[test]
    fn test_assign_overwrites() {
        let mut a = FixedSlotAssignment::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert_eq!(a.assign(SlotKey::Top, first), None);
        assert_eq!(a.assign(SlotKey::Top, second), Some(first));

        assert_eq!(a.get(SlotKey::Top), Some(second));
        assert_eq!(a.len(), 1);
        assert!(!a.item_ids().contains(&first));
    }

    #[test]
    fn test_assign_moves_item_between_slots() {
        let mut a = FixedSlotAssignment::new();
        let id = Uuid::new_v4();
        a.assign(SlotKey::Top, id);
        a.assign(SlotKey::Accessory, id);

        assert_eq!(a.get(SlotKey::Top), None);
        assert_eq!(a.get(SlotKey::Accessory), Some(id));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_partial_assignment_scenario() {
        let mut a = FixedSlotAssignment::new();
        a.assign(SlotKey::Top, Uuid::new_v4());
        a.assign(SlotKey::Bottom, Uuid::new_v4());

        assert!(!a.is_full());
        assert!(a.has_any_item());
        assert_eq!(a.missing_required(), vec![SlotKey::Shoes]);
    }

    #[test]
    fn test_is_full_ignores_accessory() {
        let (mut a, _) = full();
        assert!(a.is_full());
        a.assign(SlotKey::Accessory, Uuid::new_v4());
        assert!(a.is_full());
        a.clear(SlotKey::Accessory);
        assert!(a.is_full());
    }

    #[test]
    fn test_accessory_alone_is_not_full() {
        let mut a = FixedSlotAssignment::new();
        a.assign(SlotKey::Accessory, Uuid::new_v4());
        assert!(a.has_any_item());
        assert!(!a.is_full());
    }

    #[test]
    fn test_clear_and_clear_all() {
        let (mut a, ids) = full();
        assert_eq!(a.clear(SlotKey::Bottom), Some(ids[1]));
        assert_eq!(a.clear(SlotKey::Bottom), None);
        assert!(!a.is_full());

        a.clear_all();
        assert!(a.is_empty());
    }

    #[test]
    fn test_remove_item() {
        let (mut a, ids) = full();
        assert_eq!(a.remove_item(ids[2]), Some(SlotKey::Shoes));
        assert_eq!(a.remove_item(ids[2]), None);
        assert_eq!(a.get(SlotKey::Shoes), None);
    }

    #[test]
    fn test_occupied_in_display_order() {
        let mut a = FixedSlotAssignment::new();
        let acc = Uuid::new_v4();
        let top = Uuid::new_v4();
        a.assign(SlotKey::Accessory, acc);
        a.assign(SlotKey::Top, top);
        let slots: Vec<SlotKey> = a.occupied().map(|(s, _)| s).collect();
        assert_eq!(slots, vec![SlotKey::Top, SlotKey::Accessory]);
    }

    #[test]
    fn test_slot_key_parse() {
        assert_eq!("Shoes".parse::<SlotKey>().unwrap(), SlotKey::Shoes);
        let err = "hat".parse::<SlotKey>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_slot_key_display_roundtrip() {
        for slot in SlotKey::ALL {
            assert_eq!(slot.to_string().parse::<SlotKey>().unwrap(), slot);
        }
    }
}
