//! Saved outfit browsing: filters and the in-memory outfit list.
//!
//! Unlike the item catalog, free text matches outfit **names only**, and
//! there is no favorites pseudo-filter; a type filter is a plain equality
//! check on the outfit's type label.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{
    OUTFIT_TYPES, OUTFIT_TYPE_ALL, OUTFIT_TYPE_OTHER_LABEL, OUTFIT_TYPE_UNCATEGORIZED_LABEL,
};
use crate::models::SavedOutfit;

/// Type half of an [`OutfitFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeFilter {
    #[default]
    All,
    Type(String),
}

impl TypeFilter {
    pub fn matches(&self, outfit: &SavedOutfit) -> bool {
        match self {
            Self::All => true,
            Self::Type(t) => outfit.outfit_type.as_deref() == Some(t.as_str()),
        }
    }
}

impl From<String> for TypeFilter {
    fn from(s: String) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == OUTFIT_TYPE_ALL {
            Self::All
        } else {
            Self::Type(trimmed.to_string())
        }
    }
}

impl From<&str> for TypeFilter {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<TypeFilter> for String {
    fn from(f: TypeFilter) -> Self {
        match f {
            TypeFilter::All => OUTFIT_TYPE_ALL.to_string(),
            TypeFilter::Type(t) => t,
        }
    }
}

/// Filter for [`filter`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default)]
    pub type_filter: TypeFilter,
}

impl OutfitFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn with_type(mut self, type_filter: impl Into<TypeFilter>) -> Self {
        self.type_filter = type_filter.into();
        self
    }

    pub fn matches(&self, outfit: &SavedOutfit) -> bool {
        let name_matches = match self.search_text.as_deref() {
            None => true,
            Some(text) => outfit
                .name
                .to_lowercase()
                .contains(&text.to_lowercase()),
        };
        name_matches && self.type_filter.matches(outfit)
    }
}

/// Outfits matching `f`, in their original order.
pub fn filter<'a>(outfits: &'a [SavedOutfit], f: &OutfitFilter) -> Vec<&'a SavedOutfit> {
    outfits.iter().filter(|o| f.matches(o)).collect()
}

/// Display label for an outfit type value.
pub fn outfit_type_label(outfit_type: Option<&str>) -> &'static str {
    match outfit_type {
        None => OUTFIT_TYPE_UNCATEGORIZED_LABEL,
        Some(value) => OUTFIT_TYPES
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, label)| *label)
            .unwrap_or(OUTFIT_TYPE_OTHER_LABEL),
    }
}

/// What a delete did, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    /// The record was already gone; treated as success.
    AlreadyGone,
}

/// Saved outfits as last acknowledged by the store, newest first.
#[derive(Debug, Clone, Default)]
pub struct OutfitList {
    outfits: Vec<SavedOutfit>,
}

impl OutfitList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outfits(outfits: Vec<SavedOutfit>) -> Self {
        Self { outfits }
    }

    pub fn replace_all(&mut self, outfits: Vec<SavedOutfit>) {
        self.outfits = outfits;
    }

    pub fn outfits(&self) -> &[SavedOutfit] {
        &self.outfits
    }

    pub fn len(&self) -> usize {
        self.outfits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outfits.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&SavedOutfit> {
        self.outfits.iter().find(|o| o.id == id)
    }

    pub fn filter(&self, f: &OutfitFilter) -> Vec<&SavedOutfit> {
        filter(&self.outfits, f)
    }

    /// Merge a canonical record; new outfits go to the front.
    pub fn upsert(&mut self, outfit: SavedOutfit) -> bool {
        match self.outfits.iter_mut().find(|o| o.id == outfit.id) {
            Some(existing) => {
                *existing = outfit;
                false
            }
            None => {
                self.outfits.insert(0, outfit);
                true
            }
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<SavedOutfit> {
        let pos = self.outfits.iter().position(|o| o.id == id)?;
        Some(self.outfits.remove(pos))
    }
}
