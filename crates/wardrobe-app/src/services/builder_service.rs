//! Outfit builder: the assignment being composed and the save call.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use uuid::Uuid;

use wardrobe_core::{
    from_record_in, to_record, Catalog, ClothingItem, Error, FixedSlotAssignment,
    MultiSelectAssignment, OutfitAssignment, OutfitRepository, Result, SavedOutfit, SlotKey,
};

use super::{lock, BusyFlag, ViewScope};

/// Service backing the outfit builder view.
pub struct OutfitBuilderService {
    outfits: Arc<dyn OutfitRepository>,
    user_id: Uuid,
    state: Mutex<OutfitAssignment>,
    busy: BusyFlag,
    scope: ViewScope,
}

impl OutfitBuilderService {
    fn with_assignment(
        outfits: Arc<dyn OutfitRepository>,
        user_id: Uuid,
        assignment: OutfitAssignment,
    ) -> Self {
        Self {
            outfits,
            user_id,
            state: Mutex::new(assignment),
            busy: BusyFlag::new(),
            scope: ViewScope::new(),
        }
    }

    /// Builder with the top / bottom / shoes / accessory template.
    pub fn fixed(outfits: Arc<dyn OutfitRepository>, user_id: Uuid) -> Self {
        Self::with_assignment(outfits, user_id, FixedSlotAssignment::new().into())
    }

    /// Builder with free multi-selection.
    pub fn free(outfits: Arc<dyn OutfitRepository>, user_id: Uuid) -> Self {
        Self::with_assignment(outfits, user_id, MultiSelectAssignment::new().into())
    }

    pub fn assignment(&self) -> OutfitAssignment {
        lock(&self.state).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn detach(&self) {
        self.scope.detach();
    }

    /// Put an item into a slot. Returns the displaced item id.
    pub fn assign(&self, slot: SlotKey, item_id: Uuid) -> Result<Option<Uuid>> {
        match &mut *lock(&self.state) {
            OutfitAssignment::Fixed(slots) => Ok(slots.assign(slot, item_id)),
            OutfitAssignment::Free(_) => Err(Error::InvalidInput(
                "Slot assignment needs a fixed-slot builder".to_string(),
            )),
        }
    }

    pub fn clear_slot(&self, slot: SlotKey) -> Result<Option<Uuid>> {
        match &mut *lock(&self.state) {
            OutfitAssignment::Fixed(slots) => Ok(slots.clear(slot)),
            OutfitAssignment::Free(_) => Err(Error::InvalidInput(
                "Slot assignment needs a fixed-slot builder".to_string(),
            )),
        }
    }

    /// Select or deselect an item. Returns whether it is now selected.
    pub fn toggle(&self, item: &ClothingItem) -> Result<bool> {
        match &mut *lock(&self.state) {
            OutfitAssignment::Free(selection) => Ok(selection.toggle(item)),
            OutfitAssignment::Fixed(_) => Err(Error::InvalidInput(
                "Toggling items needs a free-selection builder".to_string(),
            )),
        }
    }

    pub fn clear(&self) {
        lock(&self.state).clear();
    }

    /// Drop a deleted item from the assignment.
    pub fn forget_item(&self, item_id: Uuid) -> bool {
        lock(&self.state).remove_item(item_id)
    }

    /// Replace the assignment with a saved outfit's items, resolved against
    /// `catalog`. Returns the ids that no longer exist.
    pub fn load(&self, outfit: &SavedOutfit, catalog: &Catalog) -> Vec<Uuid> {
        let restored = from_record_in(&outfit.items, catalog);
        if !restored.is_intact() {
            warn!(
                subsystem = "outfits",
                component = "builder_service",
                op = "load",
                outfit_id = %outfit.id,
                missing_count = restored.missing.len(),
                "Saved outfit references deleted items"
            );
        }
        *lock(&self.state) = restored.assignment;
        restored.missing
    }

    /// Persist the current assignment.
    ///
    /// Validation runs before any store call. On success the builder is
    /// cleared for the next outfit; on failure it is left as it was.
    pub async fn save(
        &self,
        name: &str,
        outfit_type: Option<&str>,
        season: Option<&str>,
    ) -> Result<Option<SavedOutfit>> {
        let _busy = self.busy.try_acquire("save_outfit")?;
        let ticket = self.scope.ticket();

        let snapshot = lock(&self.state).clone();
        let mut record = to_record(&snapshot, name, outfit_type)?;
        if let Some(season) = season {
            record = record.with_season(season);
        }

        let saved = self.outfits.insert(self.user_id, record).await?;
        if !self.scope.is_current(ticket) {
            return Ok(None);
        }

        {
            let mut state = lock(&self.state);
            if *state == snapshot {
                state.clear();
            }
        }
        info!(
            subsystem = "outfits",
            component = "builder_service",
            op = "save",
            outfit_id = %saved.id,
            item_count = saved.items.item_ids().len(),
            "Outfit saved"
        );
        Ok(Some(saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wardrobe_core::{ItemCategory, OutfitItems, SlotRefs};
    use wardrobe_db::InMemoryStore;

    fn item(name: &str, category: ItemCategory) -> ClothingItem {
        let now = Utc::now();
        ClothingItem {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            category,
            color: "Black".to_string(),
            image_url: "http://img/x.png".to_string(),
            purchase_link: None,
            is_favorite: false,
            created_at_utc: now,
            updated_at_utc: now,
        }
    }

    fn fill(svc: &OutfitBuilderService) -> [Uuid; 3] {
        let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        svc.assign(SlotKey::Top, ids[0]).unwrap();
        svc.assign(SlotKey::Bottom, ids[1]).unwrap();
        svc.assign(SlotKey::Shoes, ids[2]).unwrap();
        ids
    }

    #[tokio::test]
    async fn test_save_fixed_outfit() {
        let store = InMemoryStore::new();
        let svc = OutfitBuilderService::fixed(Arc::new(store.clone()), Uuid::new_v4());
        let ids = fill(&svc);

        let saved = svc
            .save(" Monday ", Some("business"), Some("winter"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(saved.name, "Monday");
        assert_eq!(saved.outfit_type.as_deref(), Some("business"));
        assert_eq!(saved.season.as_deref(), Some("winter"));
        assert_eq!(
            saved.items,
            OutfitItems::Slots(SlotRefs {
                top: Some(ids[0]),
                bottom: Some(ids[1]),
                shoes: Some(ids[2]),
                accessory: None,
            })
        );
        assert!(!svc.assignment().has_any_item());
    }

    #[tokio::test]
    async fn test_partial_assignment_is_rejected_without_store_call() {
        let store = InMemoryStore::new();
        let svc = OutfitBuilderService::fixed(Arc::new(store.clone()), Uuid::new_v4());
        svc.assign(SlotKey::Top, Uuid::new_v4()).unwrap();
        svc.assign(SlotKey::Bottom, Uuid::new_v4()).unwrap();

        let err = svc.save("Half done", None, None).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.call_count("outfits.insert"), 0);
        assert!(svc.assignment().has_any_item());
        assert!(!svc.is_busy());
    }

    #[tokio::test]
    async fn test_save_failure_keeps_assignment() {
        let store = InMemoryStore::new();
        store.fail_on("outfits.insert");
        let svc = OutfitBuilderService::fixed(Arc::new(store.clone()), Uuid::new_v4());
        fill(&svc);
        let before = svc.assignment();

        let err = svc.save("Friday", None, None).await.unwrap_err();

        assert!(matches!(err, Error::Remote(_)));
        assert_eq!(svc.assignment(), before);
    }

    #[tokio::test]
    async fn test_free_builder_toggles_and_saves_list() {
        let store = InMemoryStore::new();
        let svc = OutfitBuilderService::free(Arc::new(store.clone()), Uuid::new_v4());
        let shirt = item("Shirt", ItemCategory::Tops);
        let scarf = item("Scarf", ItemCategory::Accessories);

        assert!(svc.toggle(&shirt).unwrap());
        assert!(svc.toggle(&scarf).unwrap());
        assert!(!svc.toggle(&scarf).unwrap());
        assert!(svc.assign(SlotKey::Top, shirt.id).is_err());

        let saved = svc.save("Just a shirt", None, None).await.unwrap().unwrap();
        assert_eq!(saved.items, OutfitItems::List(vec![shirt.id]));
        assert!(saved.outfit_type.is_none());
    }

    #[tokio::test]
    async fn test_load_reports_deleted_items() {
        let store = InMemoryStore::new();
        let svc = OutfitBuilderService::fixed(Arc::new(store.clone()), Uuid::new_v4());
        let top = item("Tee", ItemCategory::Tops);
        let bottom = item("Jeans", ItemCategory::Bottoms);
        let gone = Uuid::new_v4();
        let catalog = Catalog::from_items(vec![top.clone(), bottom.clone()]);

        let now = Utc::now();
        let outfit = SavedOutfit {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Old".to_string(),
            outfit_type: None,
            season: None,
            is_favorite: false,
            items: OutfitItems::Slots(SlotRefs {
                top: Some(top.id),
                bottom: Some(bottom.id),
                shoes: Some(gone),
                accessory: None,
            }),
            created_at_utc: now,
            updated_at_utc: now,
        };

        assert_eq!(svc.load(&outfit, &catalog), vec![gone]);
        assert_eq!(svc.assignment().item_ids(), vec![top.id, bottom.id]);
        assert!(svc.forget_item(top.id));
        assert_eq!(svc.assignment().item_ids(), vec![bottom.id]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_save_is_rejected() {
        let store = InMemoryStore::new().with_latency_ms(100);
        let svc = OutfitBuilderService::fixed(Arc::new(store.clone()), Uuid::new_v4());
        fill(&svc);

        let (first, second) = tokio::join!(
            svc.save("Once", None, None),
            svc.save("Twice", None, None)
        );

        assert!(first.unwrap().is_some());
        assert!(matches!(second, Err(Error::Busy(_))));
        assert_eq!(store.call_count("outfits.insert"), 1);
    }
}
