//! In-memory store for tests and offline use.
//!
//! Implements every store trait over process memory with the same
//! ownership and ordering rules as the PostgreSQL repositories. Latency
//! and per-operation failures can be injected to exercise the service
//! layer's busy and error paths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wardrobe_db::memory::InMemoryStore;
//!
//! let store = InMemoryStore::new().with_latency_ms(20);
//! store.fail_on("outfits.insert");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use wardrobe_core::{
    defaults, new_v7, validate_name, BlobStore, ClothingItem, ClothingItemRepository,
    CreateItemRequest, Error, ListItemsRequest, ListOutfitsRequest, NewOutfitRecord, OutfitItems,
    OutfitRepository, Result, SavedOutfit, UpdateItemRequest,
};

/// In-memory implementation of the item, outfit and blob stores.
#[derive(Clone)]
pub struct InMemoryStore {
    config: Arc<MemoryConfig>,
    state: Arc<Mutex<MemoryState>>,
    call_log: Arc<Mutex<Vec<StoreCall>>>,
}

#[derive(Debug, Clone)]
struct MemoryConfig {
    latency_ms: u64,
    public_base_url: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            public_base_url: defaults::PUBLIC_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<ClothingItem>,
    outfits: Vec<SavedOutfit>,
    blobs: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
}

/// One recorded store call.
#[derive(Debug, Clone)]
pub struct StoreCall {
    /// `"{store}.{method}"`, e.g. `"items.list"`.
    pub operation: String,
    pub user_id: Option<Uuid>,
    pub timestamp: Instant,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MemoryConfig::default()),
            state: Arc::new(Mutex::new(MemoryState::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Delay every call by `latency_ms` before it touches state.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).public_base_url =
            url.into().trim_end_matches('/').to_string();
        self
    }

    /// Make `operation` fail with a remote error until [`Self::succeed_on`].
    pub fn fail_on(&self, operation: &str) {
        lock(&self.state).failing.insert(operation.to_string());
    }

    pub fn succeed_on(&self, operation: &str) {
        lock(&self.state).failing.remove(operation);
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<StoreCall> {
        lock(&self.call_log).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.call_log).clear()
    }

    /// Number of logged calls to `operation`.
    pub fn call_count(&self, operation: &str) -> usize {
        lock(&self.call_log)
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Stored bytes for a blob path.
    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        lock(&self.state).blobs.get(path).cloned()
    }

    pub fn blob_count(&self) -> usize {
        lock(&self.state).blobs.len()
    }

    /// Remove an item directly, bypassing the call log and failure
    /// injection. Simulates a delete made from another session.
    pub fn remove_item_externally(&self, id: Uuid) -> bool {
        remove_item(&mut lock(&self.state), id)
    }

    /// Remove an outfit directly; see [`Self::remove_item_externally`].
    pub fn remove_outfit_externally(&self, id: Uuid) -> bool {
        let mut state = lock(&self.state);
        let before = state.outfits.len();
        state.outfits.retain(|o| o.id != id);
        state.outfits.len() != before
    }

    async fn begin(&self, operation: &str, user_id: Option<Uuid>) -> Result<()> {
        lock(&self.call_log).push(StoreCall {
            operation: operation.to_string(),
            user_id,
            timestamp: Instant::now(),
        });

        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if lock(&self.state).failing.contains(operation) {
            return Err(Error::Remote(format!("simulated failure: {}", operation)));
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Delete an item and clear slot references to it, like the FK rule does.
fn remove_item(state: &mut MemoryState, id: Uuid) -> bool {
    let before = state.items.len();
    state.items.retain(|i| i.id != id);
    if state.items.len() == before {
        return false;
    }
    for outfit in state.outfits.iter_mut() {
        if let OutfitItems::Slots(refs) = &mut outfit.items {
            for slot in [
                &mut refs.top,
                &mut refs.bottom,
                &mut refs.shoes,
                &mut refs.accessory,
            ] {
                if *slot == Some(id) {
                    *slot = None;
                }
            }
        }
    }
    true
}

fn page_limit(limit: Option<i64>) -> usize {
    usize::try_from(limit.unwrap_or(defaults::PAGE_LIMIT)).unwrap_or(0)
}

fn page_offset(offset: Option<i64>) -> usize {
    usize::try_from(offset.unwrap_or(0)).unwrap_or(0)
}

#[async_trait]
impl ClothingItemRepository for InMemoryStore {
    async fn insert(&self, user_id: Uuid, req: CreateItemRequest) -> Result<ClothingItem> {
        self.begin("items.insert", Some(user_id)).await?;
        req.validate()?;

        let now = Utc::now();
        let item = ClothingItem {
            id: new_v7(),
            user_id,
            name: req.name.trim().to_string(),
            category: req.category,
            color: req.color.trim().to_string(),
            image_url: req.image_url,
            purchase_link: req.purchase_link.map(|l| l.trim().to_string()),
            is_favorite: false,
            created_at_utc: now,
            updated_at_utc: now,
        };
        lock(&self.state).items.insert(0, item.clone());
        Ok(item)
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<ClothingItem> {
        self.begin("items.fetch", Some(user_id)).await?;
        lock(&self.state)
            .items
            .iter()
            .find(|i| i.id == id && i.user_id == user_id)
            .cloned()
            .ok_or(Error::ItemNotFound(id))
    }

    async fn list(&self, user_id: Uuid, req: ListItemsRequest) -> Result<Vec<ClothingItem>> {
        self.begin("items.list", Some(user_id)).await?;
        Ok(lock(&self.state)
            .items
            .iter()
            .filter(|i| i.user_id == user_id)
            .filter(|i| req.category.as_ref().map_or(true, |c| &i.category == c))
            .filter(|i| !req.favorites_only || i.is_favorite)
            .skip(page_offset(req.offset))
            .take(page_limit(req.limit))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateItemRequest,
    ) -> Result<ClothingItem> {
        self.begin("items.update", Some(user_id)).await?;
        req.validate()?;

        let mut state = lock(&self.state);
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id && i.user_id == user_id)
            .ok_or(Error::ItemNotFound(id))?;
        if !req.is_empty() {
            req.apply_to(item);
            item.updated_at_utc = Utc::now();
        }
        Ok(item.clone())
    }

    async fn set_favorite(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<ClothingItem> {
        self.begin("items.set_favorite", Some(user_id)).await?;
        let mut state = lock(&self.state);
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id && i.user_id == user_id)
            .ok_or(Error::ItemNotFound(id))?;
        item.is_favorite = is_favorite;
        item.updated_at_utc = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.begin("items.delete", Some(user_id)).await?;
        let mut state = lock(&self.state);
        let owned = state
            .items
            .iter()
            .any(|i| i.id == id && i.user_id == user_id);
        Ok(owned && remove_item(&mut state, id))
    }
}

#[async_trait]
impl OutfitRepository for InMemoryStore {
    async fn insert(&self, user_id: Uuid, record: NewOutfitRecord) -> Result<SavedOutfit> {
        self.begin("outfits.insert", Some(user_id)).await?;
        validate_name("Outfit name", &record.name)?;

        let now = Utc::now();
        let outfit = SavedOutfit {
            id: new_v7(),
            user_id,
            name: record.name.trim().to_string(),
            outfit_type: record.outfit_type,
            season: record.season,
            is_favorite: false,
            items: record.items,
            created_at_utc: now,
            updated_at_utc: now,
        };
        lock(&self.state).outfits.insert(0, outfit.clone());
        Ok(outfit)
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<SavedOutfit> {
        self.begin("outfits.fetch", Some(user_id)).await?;
        lock(&self.state)
            .outfits
            .iter()
            .find(|o| o.id == id && o.user_id == user_id)
            .cloned()
            .ok_or(Error::OutfitNotFound(id))
    }

    async fn list(&self, user_id: Uuid, req: ListOutfitsRequest) -> Result<Vec<SavedOutfit>> {
        self.begin("outfits.list", Some(user_id)).await?;
        Ok(lock(&self.state)
            .outfits
            .iter()
            .filter(|o| o.user_id == user_id)
            .filter(|o| {
                req.outfit_type
                    .as_deref()
                    .map_or(true, |t| o.outfit_type.as_deref() == Some(t))
            })
            .filter(|o| !req.favorites_only || o.is_favorite)
            .skip(page_offset(req.offset))
            .take(page_limit(req.limit))
            .cloned()
            .collect())
    }

    async fn set_favorite(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<SavedOutfit> {
        self.begin("outfits.set_favorite", Some(user_id)).await?;
        let mut state = lock(&self.state);
        let outfit = state
            .outfits
            .iter_mut()
            .find(|o| o.id == id && o.user_id == user_id)
            .ok_or(Error::OutfitNotFound(id))?;
        outfit.is_favorite = is_favorite;
        outfit.updated_at_utc = Utc::now();
        Ok(outfit.clone())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        self.begin("outfits.delete", Some(user_id)).await?;
        let mut state = lock(&self.state);
        let before = state.outfits.len();
        state
            .outfits
            .retain(|o| !(o.id == id && o.user_id == user_id));
        Ok(state.outfits.len() != before)
    }
}

#[async_trait]
impl BlobStore for InMemoryStore {
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String> {
        self.begin("blobs.upload", None).await?;
        lock(&self.state)
            .blobs
            .insert(path.to_string(), data.to_vec());
        Ok(format!(
            "{}/{}/{}",
            self.config.public_base_url,
            defaults::IMAGE_BUCKET,
            path
        ))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.begin("blobs.remove", None).await?;
        lock(&self.state).blobs.remove(path);
        Ok(())
    }
}
