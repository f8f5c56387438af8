//! Wardrobe view: the user's items plus item mutations.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use wardrobe_core::{
    defaults, image_storage_path, validate_image, BlobStore, Catalog, ClothingItem,
    ClothingItemRepository, CreateItemRequest, DeleteOutcome, Error, ItemCategory, ItemFilter,
    ListItemsRequest, Result, SlotKey, UpdateItemRequest,
};

use super::{lock, BusyFlag, ViewScope, ViewTicket};

/// Form fields for a new item; the image travels separately as bytes.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub category: ItemCategory,
    pub color: String,
    pub purchase_link: Option<String>,
}

/// Service backing the wardrobe view.
pub struct CatalogService {
    items: Arc<dyn ClothingItemRepository>,
    blobs: Arc<dyn BlobStore>,
    user_id: Uuid,
    max_image_bytes: u64,
    state: Mutex<Catalog>,
    busy: BusyFlag,
    scope: ViewScope,
}

impl CatalogService {
    pub fn new(
        items: Arc<dyn ClothingItemRepository>,
        blobs: Arc<dyn BlobStore>,
        user_id: Uuid,
    ) -> Self {
        Self {
            items,
            blobs,
            user_id,
            max_image_bytes: defaults::MAX_IMAGE_BYTES,
            state: Mutex::new(Catalog::new()),
            busy: BusyFlag::new(),
            scope: ViewScope::new(),
        }
    }

    pub fn with_max_image_bytes(mut self, max: u64) -> Self {
        self.max_image_bytes = max;
        self
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// The view was torn down; in-flight responses will be discarded.
    pub fn detach(&self) {
        self.scope.detach();
    }

    // ─── Queries ───────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Vec<ClothingItem> {
        lock(&self.state).items().to_vec()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<ClothingItem> {
        lock(&self.state).get(id).cloned()
    }

    pub fn list(&self, filter: &ItemFilter) -> Vec<ClothingItem> {
        lock(&self.state)
            .list_items(filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Items the outfit builder offers for `slot`.
    pub fn items_for_slot(&self, slot: SlotKey) -> Vec<ClothingItem> {
        lock(&self.state)
            .items_for_slot(slot)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn category_counts(&self) -> BTreeMap<ItemCategory, usize> {
        lock(&self.state).category_counts()
    }

    /// Run `f` against the current catalog.
    pub fn with_catalog<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        f(&lock(&self.state))
    }

    // ─── Store operations ──────────────────────────────────────────────────

    /// Reload every item from the store, page by page. Returns the item
    /// count.
    pub async fn refresh(&self) -> Result<Option<usize>> {
        let ticket = self.scope.ticket();
        let start = Instant::now();

        let items = self.load_all().await.map_err(|e| {
            warn!(
                subsystem = "catalog",
                component = "catalog_service",
                op = "refresh",
                error = %e,
                "Failed to load items"
            );
            e
        })?;

        if !self.scope.is_current(ticket) {
            debug!(
                subsystem = "catalog",
                component = "catalog_service",
                op = "refresh",
                "Dropping item list for detached view"
            );
            return Ok(None);
        }

        let count = items.len();
        lock(&self.state).replace_all(items);
        debug!(
            subsystem = "catalog",
            component = "catalog_service",
            op = "refresh",
            result_count = count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Items loaded"
        );
        Ok(Some(count))
    }

    async fn load_all(&self) -> Result<Vec<ClothingItem>> {
        let mut items = Vec::new();
        loop {
            let page = self
                .items
                .list(
                    self.user_id,
                    ListItemsRequest {
                        limit: Some(defaults::PAGE_LIMIT),
                        offset: Some(items.len() as i64),
                        ..Default::default()
                    },
                )
                .await?;
            let last = page.len() < defaults::PAGE_LIMIT as usize;
            items.extend(page);
            if last {
                return Ok(items);
            }
        }
    }

    /// Drop a record the store no longer has, if `err` says so.
    fn forget_if_gone(&self, id: Uuid, err: Error, ticket: ViewTicket) -> Error {
        if err.is_not_found() && self.scope.is_current(ticket) {
            lock(&self.state).remove(id);
            debug!(
                subsystem = "catalog",
                component = "catalog_service",
                item_id = %id,
                "Removed item the store no longer has"
            );
        }
        err
    }

    /// Validate, upload the image, then insert the item.
    ///
    /// If the insert fails the uploaded image is removed again.
    pub async fn add_item(&self, new: NewItem, image: &[u8]) -> Result<Option<ClothingItem>> {
        let _busy = self.busy.try_acquire("add_item")?;
        let ticket = self.scope.ticket();

        let mut req = CreateItemRequest {
            name: new.name,
            category: new.category,
            color: new.color,
            image_url: String::new(),
            purchase_link: new.purchase_link.filter(|l| !l.trim().is_empty()),
        };
        req.validate_details()?;
        let checked = validate_image(image, self.max_image_bytes)?;

        let path = image_storage_path(self.user_id, &checked.extension);
        req.image_url = self.blobs.upload(&path, image).await?;

        let item = match self.items.insert(self.user_id, req).await {
            Ok(item) => item,
            Err(e) => {
                warn!(
                    subsystem = "catalog",
                    component = "catalog_service",
                    op = "add_item",
                    storage_path = %path,
                    error = %e,
                    "Item insert failed, removing uploaded image"
                );
                if let Err(cleanup) = self.blobs.remove(&path).await {
                    warn!(storage_path = %path, error = %cleanup, "Orphaned image left in storage");
                }
                return Err(e);
            }
        };

        if !self.scope.is_current(ticket) {
            return Ok(None);
        }
        lock(&self.state).upsert(item.clone());
        info!(
            subsystem = "catalog",
            component = "catalog_service",
            op = "add_item",
            item_id = %item.id,
            mime_type = %checked.mime_type,
            size_bytes = image.len(),
            "Item added"
        );
        Ok(Some(item))
    }

    /// Update editable fields and merge the canonical record. A stale id is
    /// dropped from the catalog before the not-found error is returned.
    pub async fn edit_item(&self, id: Uuid, req: UpdateItemRequest) -> Result<Option<ClothingItem>> {
        let _busy = self.busy.try_acquire("edit_item")?;
        req.validate()?;
        let ticket = self.scope.ticket();

        let item = self
            .items
            .update(self.user_id, id, req)
            .await
            .map_err(|e| self.forget_if_gone(id, e, ticket))?;
        if !self.scope.is_current(ticket) {
            return Ok(None);
        }
        lock(&self.state).upsert(item.clone());
        info!(
            subsystem = "catalog",
            component = "catalog_service",
            op = "edit_item",
            item_id = %id,
            "Item updated"
        );
        Ok(Some(item))
    }

    pub async fn set_favorite(&self, id: Uuid, is_favorite: bool) -> Result<Option<ClothingItem>> {
        let _busy = self.busy.try_acquire("set_favorite")?;
        let ticket = self.scope.ticket();

        let item = self
            .items
            .set_favorite(self.user_id, id, is_favorite)
            .await
            .map_err(|e| self.forget_if_gone(id, e, ticket))?;
        if !self.scope.is_current(ticket) {
            return Ok(None);
        }
        lock(&self.state).upsert(item.clone());
        Ok(Some(item))
    }

    /// Flip the favorite flag of an item in the current catalog.
    pub async fn toggle_favorite(&self, id: Uuid) -> Result<Option<ClothingItem>> {
        let current = lock(&self.state)
            .get(id)
            .map(|item| item.is_favorite)
            .ok_or(Error::ItemNotFound(id))?;
        self.set_favorite(id, !current).await
    }

    /// Delete an item. An id the store no longer has is reported as
    /// [`DeleteOutcome::AlreadyGone`], not as an error.
    pub async fn delete_item(&self, id: Uuid) -> Result<Option<DeleteOutcome>> {
        let _busy = self.busy.try_acquire("delete_item")?;
        let ticket = self.scope.ticket();

        let deleted = self.items.delete(self.user_id, id).await?;
        if !self.scope.is_current(ticket) {
            return Ok(None);
        }
        lock(&self.state).remove(id);

        let outcome = if deleted {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::AlreadyGone
        };
        info!(
            subsystem = "catalog",
            component = "catalog_service",
            op = "delete_item",
            item_id = %id,
            outcome = ?outcome,
            "Item delete"
        );
        Ok(Some(outcome))
    }
}
