//! Saved outfit repository implementation.
//!
//! Both item shapes share one table. `items_shape` says which columns carry
//! the references; the other set is left empty.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use wardrobe_core::{
    defaults, new_v7, validate_name, Error, ListOutfitsRequest, NewOutfitRecord, OutfitItems,
    OutfitRepository, Result, SavedOutfit, SlotRefs,
};

const OUTFIT_COLUMNS: &str = "id, user_id, name, outfit_type, season, is_favorite, items_shape, \
                              top_id, bottom_id, shoes_id, accessory_id, item_ids, \
                              created_at_utc, updated_at_utc";

const SHAPE_SLOTS: &str = "slots";
const SHAPE_LIST: &str = "list";

/// PostgreSQL implementation of OutfitRepository.
#[derive(Clone)]
pub struct PgOutfitRepository {
    pool: Pool<Postgres>,
}

impl PgOutfitRepository {
    /// Create a new PgOutfitRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_outfit(r: &PgRow) -> Result<SavedOutfit> {
    let shape: String = r.get("items_shape");
    let items = match shape.as_str() {
        SHAPE_SLOTS => OutfitItems::Slots(SlotRefs {
            top: r.get("top_id"),
            bottom: r.get("bottom_id"),
            shoes: r.get("shoes_id"),
            accessory: r.get("accessory_id"),
        }),
        SHAPE_LIST => OutfitItems::List(r.get::<Vec<Uuid>, _>("item_ids")),
        other => {
            return Err(Error::Serialization(format!(
                "Unknown outfit items shape: {}",
                other
            )))
        }
    };

    Ok(SavedOutfit {
        id: r.get("id"),
        user_id: r.get("user_id"),
        name: r.get("name"),
        outfit_type: r.get("outfit_type"),
        season: r.get("season"),
        is_favorite: r.get("is_favorite"),
        items,
        created_at_utc: r.get("created_at_utc"),
        updated_at_utc: r.get("updated_at_utc"),
    })
}

#[async_trait]
impl OutfitRepository for PgOutfitRepository {
    async fn insert(&self, user_id: Uuid, record: NewOutfitRecord) -> Result<SavedOutfit> {
        validate_name("Outfit name", &record.name)?;
        let id = new_v7();
        let now = Utc::now();

        let (shape, slots, list) = match &record.items {
            OutfitItems::Slots(refs) => (SHAPE_SLOTS, refs.clone(), Vec::new()),
            OutfitItems::List(ids) => (SHAPE_LIST, SlotRefs::default(), ids.clone()),
        };

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO outfit (id, user_id, name, outfit_type, season, is_favorite, items_shape,
                                top_id, bottom_id, shoes_id, accessory_id, item_ids,
                                created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {}
            "#,
            OUTFIT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(record.name.trim())
        .bind(&record.outfit_type)
        .bind(&record.season)
        .bind(shape)
        .bind(slots.top)
        .bind(slots.bottom)
        .bind(slots.shoes)
        .bind(slots.accessory)
        .bind(&list)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "outfits",
            op = "insert",
            user_id = %user_id,
            outfit_id = %id,
            shape,
            "Outfit inserted"
        );
        row_to_outfit(&row)
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<SavedOutfit> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM outfit WHERE id = $1 AND user_id = $2",
            OUTFIT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => row_to_outfit(&r),
            None => Err(Error::OutfitNotFound(id)),
        }
    }

    async fn list(&self, user_id: Uuid, req: ListOutfitsRequest) -> Result<Vec<SavedOutfit>> {
        let mut clauses = vec!["user_id = $1".to_string()];
        let mut param_count = 2;

        if req.outfit_type.is_some() {
            clauses.push(format!("outfit_type = ${}", param_count));
            param_count += 1;
        }
        if req.favorites_only {
            clauses.push("is_favorite".to_string());
        }

        let query = format!(
            "SELECT {} FROM outfit WHERE {} ORDER BY created_at_utc DESC, id DESC LIMIT ${} OFFSET ${}",
            OUTFIT_COLUMNS,
            clauses.join(" AND "),
            param_count,
            param_count + 1
        );

        let mut q = sqlx::query(&query).bind(user_id);
        if let Some(outfit_type) = &req.outfit_type {
            q = q.bind(outfit_type);
        }

        let rows = q
            .bind(req.limit.unwrap_or(defaults::PAGE_LIMIT))
            .bind(req.offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "outfits",
            op = "list",
            user_id = %user_id,
            result_count = rows.len(),
            "Listed outfits"
        );
        rows.iter().map(row_to_outfit).collect()
    }

    async fn set_favorite(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<SavedOutfit> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE outfit SET is_favorite = $1, updated_at_utc = $2
            WHERE id = $3 AND user_id = $4
            RETURNING {}
            "#,
            OUTFIT_COLUMNS
        ))
        .bind(is_favorite)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => row_to_outfit(&r),
            None => Err(Error::OutfitNotFound(id)),
        }
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM outfit WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let deleted = result.rows_affected() > 0;
        info!(
            subsystem = "db",
            component = "outfits",
            op = "delete",
            outfit_id = %id,
            deleted,
            "Outfit delete"
        );
        Ok(deleted)
    }
}
