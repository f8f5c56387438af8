//! Core traits for wardrobe abstractions.
//!
//! These are the store boundaries. Every call takes the authenticated
//! `user_id` explicitly; implementations scope reads and writes to it and
//! never look up a "current user" themselves.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CLOTHING ITEM REPOSITORY
// =============================================================================

/// Repository for clothing item CRUD operations.
#[async_trait]
pub trait ClothingItemRepository: Send + Sync {
    /// Insert a new item and return the stored record.
    async fn insert(&self, user_id: Uuid, req: CreateItemRequest) -> Result<ClothingItem>;

    /// Fetch one item. Fails with `ItemNotFound` for unknown ids.
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<ClothingItem>;

    /// List items, newest first.
    async fn list(&self, user_id: Uuid, req: ListItemsRequest) -> Result<Vec<ClothingItem>>;

    /// Update editable fields and return the canonical record.
    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateItemRequest)
        -> Result<ClothingItem>;

    /// Set the favorite flag (last write wins) and return the canonical record.
    async fn set_favorite(&self, user_id: Uuid, id: Uuid, is_favorite: bool)
        -> Result<ClothingItem>;

    /// Delete an item. Returns whether a record was removed; a missing id is
    /// not an error.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

// =============================================================================
// OUTFIT REPOSITORY
// =============================================================================

/// Repository for saved outfits.
#[async_trait]
pub trait OutfitRepository: Send + Sync {
    /// Persist a record built by the persistence adapter.
    async fn insert(&self, user_id: Uuid, record: NewOutfitRecord) -> Result<SavedOutfit>;

    /// Fetch one outfit. Fails with `OutfitNotFound` for unknown ids.
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<SavedOutfit>;

    /// List outfits, newest first.
    async fn list(&self, user_id: Uuid, req: ListOutfitsRequest) -> Result<Vec<SavedOutfit>>;

    /// Set the favorite flag (last write wins) and return the canonical record.
    async fn set_favorite(&self, user_id: Uuid, id: Uuid, is_favorite: bool)
        -> Result<SavedOutfit>;

    /// Delete an outfit. Returns whether a record was removed.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

// =============================================================================
// BLOB STORE
// =============================================================================

/// Blob storage for item images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `path` and return the public URL it is served from.
    async fn upload(&self, path: &str, data: &[u8]) -> Result<String>;

    /// Remove a previously uploaded blob. Missing blobs are not an error.
    async fn remove(&self, path: &str) -> Result<()>;
}
