//! Saved outfits view: list, filter, delete, favorite.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use wardrobe_core::{
    defaults, DeleteOutcome, Error, ListOutfitsRequest, OutfitFilter, OutfitList,
    OutfitRepository, Result, SavedOutfit,
};

use super::{lock, BusyFlag, ViewScope, ViewTicket};

/// Service backing the saved outfits view.
pub struct OutfitBrowserService {
    outfits: Arc<dyn OutfitRepository>,
    user_id: Uuid,
    state: Mutex<OutfitList>,
    busy: BusyFlag,
    scope: ViewScope,
}

impl OutfitBrowserService {
    pub fn new(outfits: Arc<dyn OutfitRepository>, user_id: Uuid) -> Self {
        Self {
            outfits,
            user_id,
            state: Mutex::new(OutfitList::new()),
            busy: BusyFlag::new(),
            scope: ViewScope::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn detach(&self) {
        self.scope.detach();
    }

    pub fn snapshot(&self) -> Vec<SavedOutfit> {
        lock(&self.state).outfits().to_vec()
    }

    pub fn get(&self, id: Uuid) -> Option<SavedOutfit> {
        lock(&self.state).get(id).cloned()
    }

    /// Outfits matching `filter`, newest first.
    pub fn filter(&self, filter: &OutfitFilter) -> Vec<SavedOutfit> {
        lock(&self.state)
            .filter(filter)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Reload every saved outfit. Returns the outfit count.
    pub async fn refresh(&self) -> Result<Option<usize>> {
        let ticket = self.scope.ticket();
        let start = Instant::now();

        let outfits = self.load_all().await?;
        if !self.scope.is_current(ticket) {
            debug!(
                subsystem = "outfits",
                component = "browser_service",
                op = "refresh",
                "Dropping outfit list for detached view"
            );
            return Ok(None);
        }

        let count = outfits.len();
        lock(&self.state).replace_all(outfits);
        debug!(
            subsystem = "outfits",
            component = "browser_service",
            op = "refresh",
            result_count = count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Outfits loaded"
        );
        Ok(Some(count))
    }

    async fn load_all(&self) -> Result<Vec<SavedOutfit>> {
        let mut outfits = Vec::new();
        loop {
            let page = self
                .outfits
                .list(
                    self.user_id,
                    ListOutfitsRequest {
                        limit: Some(defaults::PAGE_LIMIT),
                        offset: Some(outfits.len() as i64),
                        ..Default::default()
                    },
                )
                .await?;
            let last = page.len() < defaults::PAGE_LIMIT as usize;
            outfits.extend(page);
            if last {
                return Ok(outfits);
            }
        }
    }

    /// Delete an outfit, then reload the list.
    ///
    /// The local copy is removed as soon as the store acknowledges; the
    /// reload is only issued after that. A failed reload is logged and does
    /// not turn a successful delete into an error.
    pub async fn delete(&self, id: Uuid) -> Result<Option<DeleteOutcome>> {
        let _busy = self.busy.try_acquire("delete_outfit")?;
        let ticket = self.scope.ticket();

        let deleted = self.outfits.delete(self.user_id, id).await?;
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
            subsystem = "outfits",
            component = "browser_service",
            op = "delete",
            outfit_id = %id,
            outcome = ?outcome,
            "Outfit delete"
        );

        if let Err(e) = self.refresh().await {
            warn!(
                subsystem = "outfits",
                component = "browser_service",
                op = "delete",
                error = %e,
                "Reload after delete failed"
            );
        }
        Ok(Some(outcome))
    }

    /// Set the favorite flag; the store's record replaces the local one.
    /// An outfit the store no longer has is dropped from the list.
    pub async fn set_favorite(&self, id: Uuid, is_favorite: bool) -> Result<Option<SavedOutfit>> {
        let _busy = self.busy.try_acquire("favorite_outfit")?;
        let ticket = self.scope.ticket();

        let outfit = self
            .outfits
            .set_favorite(self.user_id, id, is_favorite)
            .await
            .map_err(|e| self.forget_if_gone(id, e, ticket))?;
        if !self.scope.is_current(ticket) {
            return Ok(None);
        }
        lock(&self.state).upsert(outfit.clone());
        Ok(Some(outfit))
    }

    fn forget_if_gone(&self, id: Uuid, err: Error, ticket: ViewTicket) -> Error {
        if err.is_not_found() && self.scope.is_current(ticket) {
            lock(&self.state).remove(id);
            debug!(
                subsystem = "outfits",
                component = "browser_service",
                outfit_id = %id,
                "Removed outfit the store no longer has"
            );
        }
        err
    }

    pub async fn toggle_favorite(&self, id: Uuid) -> Result<Option<SavedOutfit>> {
        let current = lock(&self.state)
            .get(id)
            .map(|o| o.is_favorite)
            .ok_or(Error::OutfitNotFound(id))?;
        self.set_favorite(id, !current).await
    }
}
