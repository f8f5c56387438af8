//! In-memory item catalog and its filters.
//!
//! The catalog holds a user's items in the order the store returned them
//! (newest first). Filtering is pure: a category predicate and a free-text
//! predicate, AND-combined.
//!
//! # Category filter
//!
//! | value         | meaning                          |
//! |---------------|----------------------------------|
//! | absent, `all` | no restriction                   |
//! | `favorites`   | `is_favorite == true`            |
//! | anything else | equality with the item category  |
//!
//! Free text matches case-insensitively as a substring of the name **or**
//! the color. The outfit browser deliberately searches names only; see
//! [`crate::browser`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{CATEGORY_ALL, CATEGORY_FAVORITES};
use crate::models::{ClothingItem, ItemCategory};
use crate::slots::SlotKey;

/// Category half of an [`ItemFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Favorites,
    Category(ItemCategory),
}

impl CategoryFilter {
    pub fn matches(&self, item: &ClothingItem) -> bool {
        match self {
            Self::All => true,
            Self::Favorites => item.is_favorite,
            Self::Category(category) => item.category == *category,
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(CATEGORY_ALL),
            Self::Favorites => f.write_str(CATEGORY_FAVORITES),
            Self::Category(c) => write!(f, "{}", c),
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" | CATEGORY_ALL => Ok(Self::All),
            CATEGORY_FAVORITES => Ok(Self::Favorites),
            other => Ok(Self::Category(other.parse()?)),
        }
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = String;
    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CategoryFilter> for String {
    fn from(f: CategoryFilter) -> Self {
        f.to_string()
    }
}

/// Filter for [`list_items`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl ItemFilter {
    /// Create a filter that matches every item.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Lowercased, trimmed needle, or `None` when the search is blank.
    fn needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, item: &ClothingItem) -> bool {
        self.category.matches(item) && matches_text(item, self.needle().as_deref())
    }
}

fn matches_text(item: &ClothingItem, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => {
            item.name.to_lowercase().contains(needle) || item.color.to_lowercase().contains(needle)
        }
    }
}

/// Items matching `filter`, in their original order.
pub fn list_items<'a>(items: &'a [ClothingItem], filter: &ItemFilter) -> Vec<&'a ClothingItem> {
    let needle = filter.needle();
    items
        .iter()
        .filter(|item| filter.category.matches(item) && matches_text(item, needle.as_deref()))
        .collect()
}

/// A user's clothing items as last acknowledged by the store.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<ClothingItem>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a store listing (order is kept).
    pub fn from_items(items: Vec<ClothingItem>) -> Self {
        Self { items }
    }

    /// Replace the whole catalog with a fresh listing.
    pub fn replace_all(&mut self, items: Vec<ClothingItem>) {
        self.items = items;
    }

    pub fn items(&self) -> &[ClothingItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&ClothingItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn list_items(&self, filter: &ItemFilter) -> Vec<&ClothingItem> {
        list_items(&self.items, filter)
    }

    /// Items the builder offers for `slot` (category-compatible only).
    pub fn items_for_slot(&self, slot: SlotKey) -> Vec<&ClothingItem> {
        let category = slot.compatible_category();
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    /// Item count per category.
    pub fn category_counts(&self) -> BTreeMap<ItemCategory, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Merge the canonical record returned by a mutation.
    ///
    /// Known ids are replaced in place; new ids go to the front, matching
    /// the newest-first listing order. Returns `true` if the item was new.
    pub fn upsert(&mut self, item: ClothingItem) -> bool {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                *existing = item;
                false
            }
            None => {
                self.items.insert(0, item);
                true
            }
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<ClothingItem> {
        let pos = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(pos))
    }
}
