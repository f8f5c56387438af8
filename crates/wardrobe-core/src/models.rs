//! Core data models for wardrobe.
//!
//! These types are shared across all wardrobe crates and represent the
//! domain entities as the stores return them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{COLOR_MAX_LEN, NAME_MAX_LEN};
use crate::error::{Error, Result};

// =============================================================================
// ITEM CATEGORY
// =============================================================================

/// Category of a clothing item.
///
/// The built-in set covers what the wardrobe tabs offer; anything else is
/// kept verbatim (lowercased) in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ItemCategory {
    Tops,
    Bottoms,
    Footwear,
    Accessories,
    Outerwear,
    Other(String),
}

impl ItemCategory {
    /// Lowercase string form stored in the `category` column.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tops => "tops",
            Self::Bottoms => "bottoms",
            Self::Footwear => "footwear",
            Self::Accessories => "accessories",
            Self::Outerwear => "outerwear",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemCategory {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" => Err("Item category cannot be empty".to_string()),
            "tops" => Ok(Self::Tops),
            "bottoms" => Ok(Self::Bottoms),
            "footwear" => Ok(Self::Footwear),
            "accessories" => Ok(Self::Accessories),
            "outerwear" => Ok(Self::Outerwear),
            _ => Ok(Self::Other(normalized)),
        }
    }
}

impl TryFrom<String> for ItemCategory {
    type Error = String;
    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ItemCategory> for String {
    fn from(c: ItemCategory) -> Self {
        c.as_str().to_string()
    }
}

// =============================================================================
// CLOTHING ITEM TYPES
// =============================================================================

/// A clothing item owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: ItemCategory,
    pub color: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_link: Option<String>,
    pub is_favorite: bool,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// Request for creating a new clothing item.
///
/// `image_url` is the public URL returned by the blob store upload.
#[derive(Debug, Clone)]
pub struct CreateItemRequest {
    pub name: String,
    pub category: ItemCategory,
    pub color: String,
    pub image_url: String,
    pub purchase_link: Option<String>,
}

impl CreateItemRequest {
    /// Check the fields the upload form requires.
    pub fn validate(&self) -> Result<()> {
        self.validate_details()?;
        if self.image_url.trim().is_empty() {
            return Err(Error::Validation("An image is required".to_string()));
        }
        Ok(())
    }

    /// Everything except the image URL, which only exists after upload.
    pub fn validate_details(&self) -> Result<()> {
        validate_name("Item name", &self.name)?;
        validate_color(&self.color)?;
        if let Some(link) = &self.purchase_link {
            validate_purchase_link(link)?;
        }
        Ok(())
    }
}

/// Partial update of an item's editable fields.
#[derive(Debug, Clone, Default)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub category: Option<ItemCategory>,
    pub color: Option<String>,
    /// `Some(None)` clears the link.
    pub purchase_link: Option<Option<String>>,
}

impl UpdateItemRequest {
    /// True when the request changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.color.is_none()
            && self.purchase_link.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name("Item name", name)?;
        }
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        if let Some(Some(link)) = &self.purchase_link {
            validate_purchase_link(link)?;
        }
        Ok(())
    }

    /// Apply the update to an in-memory copy of an item.
    pub fn apply_to(&self, item: &mut ClothingItem) {
        if let Some(name) = &self.name {
            item.name = name.trim().to_string();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(color) = &self.color {
            item.color = color.trim().to_string();
        }
        if let Some(link) = &self.purchase_link {
            item.purchase_link = link.clone();
        }
    }
}

/// Request for listing items at the store boundary.
#[derive(Debug, Clone, Default)]
pub struct ListItemsRequest {
    /// Equality filter on category.
    pub category: Option<ItemCategory>,
    /// Only favorite items.
    pub favorites_only: bool,
    /// Maximum results (store default when unset).
    pub limit: Option<i64>,
    /// Rows to skip, for paging.
    pub offset: Option<i64>,
}

// =============================================================================
// OUTFIT TYPES
// =============================================================================

/// Item references of a fixed-slot outfit, as stored.
///
/// All fields are optional on read: a slot whose item was deleted comes back
/// empty. Writes always carry top, bottom and shoes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRefs {
    pub top: Option<Uuid>,
    pub bottom: Option<Uuid>,
    pub shoes: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessory: Option<Uuid>,
}

/// The two persistence shapes of an outfit's items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "items", rename_all = "snake_case")]
pub enum OutfitItems {
    /// Named foreign keys (top/bottom/shoes/accessory).
    Slots(SlotRefs),
    /// Unordered list of item ids.
    List(Vec<Uuid>),
}

impl OutfitItems {
    /// Every referenced item id.
    pub fn item_ids(&self) -> Vec<Uuid> {
        match self {
            Self::Slots(refs) => [refs.top, refs.bottom, refs.shoes, refs.accessory]
                .into_iter()
                .flatten()
                .collect(),
            Self::List(ids) => ids.clone(),
        }
    }

    pub fn references(&self, item_id: Uuid) -> bool {
        self.item_ids().contains(&item_id)
    }
}

/// A persisted, named combination of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedOutfit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Type label (casual, business, ...); `None` means uncategorized.
    #[serde(rename = "type")]
    pub outfit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    pub is_favorite: bool,
    pub items: OutfitItems,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// Outfit record ready to be written to the store.
///
/// Produced by [`crate::adapter::to_record`], which enforces the naming and
/// slot rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOutfitRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub outfit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    pub items: OutfitItems,
}

impl NewOutfitRecord {
    /// Attach a season label (blank clears it).
    pub fn with_season(mut self, season: impl Into<String>) -> Self {
        let season = season.into();
        let season = season.trim();
        self.season = (!season.is_empty()).then(|| season.to_string());
        self
    }
}

/// Request for listing outfits at the store boundary.
#[derive(Debug, Clone, Default)]
pub struct ListOutfitsRequest {
    /// Equality filter on the type label.
    pub outfit_type: Option<String>,
    pub favorites_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

/// Validate a display name (item or outfit).
pub fn validate_name(what: &str, name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} cannot be empty", what)));
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Err(Error::Validation(format!(
            "{} must be {} characters or less",
            what, NAME_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<()> {
    let trimmed = color.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Color cannot be empty".to_string()));
    }
    if trimmed.chars().count() > COLOR_MAX_LEN {
        return Err(Error::Validation(format!(
            "Color must be {} characters or less",
            COLOR_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_purchase_link(link: &str) -> Result<()> {
    let link = link.trim();
    if link.starts_with("https://") || link.starts_with("http://") {
        Ok(())
    } else {
        Err(Error::Validation(
            "Purchase link must be an http(s) URL".to_string(),
        ))
    }
}
