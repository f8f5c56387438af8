//! Centralized default constants for wardrobe.
//!
//! **This module is the single source of truth** for shared default values
//! and for the configured vocabularies (item categories, outfit types).
//! Crates reference these constants instead of defining their own.

// =============================================================================
// CATALOG FILTERS
// =============================================================================

/// Category filter value meaning "no category restriction".
pub const CATEGORY_ALL: &str = "all";

/// Pseudo-category selecting favorite items instead of a literal category.
pub const CATEGORY_FAVORITES: &str = "favorites";

/// Built-in item categories, in display order.
pub const ITEM_CATEGORIES: &[&str] = &["tops", "bottoms", "footwear", "accessories", "outerwear"];

// =============================================================================
// OUTFIT TYPES
// =============================================================================

/// Outfit type filter value meaning "no type restriction".
pub const OUTFIT_TYPE_ALL: &str = "all";

/// Outfit type vocabulary as `(value, label)` pairs.
///
/// The set is configuration, not logic: the browser compares type values by
/// equality and only uses this table for display labels.
pub const OUTFIT_TYPES: &[(&str, &str)] = &[
    ("casual", "Casual"),
    ("business", "Business"),
    ("formal", "Formal"),
    ("party", "Party"),
    ("date", "Date Night"),
    ("wedding", "Wedding"),
    ("sports", "Sports"),
    ("other", "Other"),
];

/// Label for outfits saved without a type.
pub const OUTFIT_TYPE_UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Label for type values not present in [`OUTFIT_TYPES`].
pub const OUTFIT_TYPE_OTHER_LABEL: &str = "Other";

// =============================================================================
// VALIDATION LIMITS
// =============================================================================

/// Maximum characters in an item or outfit name.
pub const NAME_MAX_LEN: usize = 120;

/// Maximum characters in an item color.
pub const COLOR_MAX_LEN: usize = 60;

/// Maximum accepted image upload size (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for list calls against the store.
pub const PAGE_LIMIT: i64 = 500;

// =============================================================================
// STORAGE
// =============================================================================

/// Blob bucket (top-level directory) holding item images.
pub const IMAGE_BUCKET: &str = "wardrobe";

/// Default filesystem root for the local blob store.
pub const STORAGE_PATH: &str = "/var/lib/wardrobe/images";

/// Default public URL prefix under which stored images are served.
pub const PUBLIC_BASE_URL: &str = "http://localhost:3000/images";

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/wardrobe";
