//! # wardrobe-core
//!
//! Core types, traits, and outfit-composition logic for wardrobe.
//!
//! Everything here is synchronous and store-agnostic: item filtering, the
//! two outfit assignment models, the persistence adapter that turns an
//! assignment into a storable record and back, and saved-outfit browsing.
//! Store access goes through the traits in [`traits`].

pub mod adapter;
pub mod browser;
pub mod catalog;
pub mod defaults;
pub mod error;
pub mod image_upload;
pub mod logging;
pub mod models;
pub mod selection;
pub mod slots;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use adapter::{from_record, from_record_in, to_record, OutfitAssignment, RestoredAssignment};
pub use browser::{outfit_type_label, DeleteOutcome, OutfitFilter, OutfitList, TypeFilter};
pub use catalog::{list_items, Catalog, CategoryFilter, ItemFilter};
pub use error::{Error, Result};
pub use image_upload::{image_storage_path, validate_image, CheckedImage};
pub use models::*;
pub use selection::{ItemRef, MultiSelectAssignment};
pub use slots::{FixedSlotAssignment, SlotKey};
pub use traits::*;
pub use uuid_utils::new_v7;
