//! Application services.
//!
//! Each service owns the in-memory state for one view, sequences store
//! calls against it, and merges acknowledged results. State sits behind a
//! `std::sync::Mutex` that is only locked between awaits.
//!
//! Every async operation returns `Ok(None)` when the view that issued it
//! was detached before the store answered; the answer is discarded.

pub mod browser_service;
pub mod builder_service;
pub mod catalog_service;
pub mod request_guard;

pub use browser_service::OutfitBrowserService;
pub use builder_service::OutfitBuilderService;
pub use catalog_service::{CatalogService, NewItem};
pub use request_guard::{BusyFlag, BusyGuard, ViewScope, ViewTicket};

use std::sync::{Mutex, MutexGuard};

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
