//! Clothing item repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use wardrobe_core::{
    defaults, new_v7, ClothingItem, ClothingItemRepository, CreateItemRequest, Error,
    ItemCategory, ListItemsRequest, Result, UpdateItemRequest,
};

const ITEM_COLUMNS: &str = "id, user_id, name, category, color, image_url, purchase_link, \
                            is_favorite, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of ClothingItemRepository.
#[derive(Clone)]
pub struct PgClothingItemRepository {
    pool: Pool<Postgres>,
}

impl PgClothingItemRepository {
    /// Create a new PgClothingItemRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_item(r: &PgRow) -> Result<ClothingItem> {
    let category: String = r.get("category");
    let category: ItemCategory = category.parse().map_err(Error::Serialization)?;
    Ok(ClothingItem {
        id: r.get("id"),
        user_id: r.get("user_id"),
        name: r.get("name"),
        category,
        color: r.get("color"),
        image_url: r.get("image_url"),
        purchase_link: r.get("purchase_link"),
        is_favorite: r.get("is_favorite"),
        created_at_utc: r.get("created_at_utc"),
        updated_at_utc: r.get("updated_at_utc"),
    })
}

#[async_trait]
impl ClothingItemRepository for PgClothingItemRepository {
    async fn insert(&self, user_id: Uuid, req: CreateItemRequest) -> Result<ClothingItem> {
        req.validate()?;
        let id = new_v7();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO wardrobe_item (id, user_id, name, category, color, image_url, purchase_link, is_favorite, created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8, $8)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(req.name.trim())
        .bind(req.category.as_str())
        .bind(req.color.trim())
        .bind(&req.image_url)
        .bind(req.purchase_link.as_deref().map(str::trim))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "items",
            op = "insert",
            user_id = %user_id,
            item_id = %id,
            "Clothing item inserted"
        );
        row_to_item(&row)
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<ClothingItem> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wardrobe_item WHERE id = $1 AND user_id = $2",
            ITEM_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => row_to_item(&r),
            None => Err(Error::ItemNotFound(id)),
        }
    }

    async fn list(&self, user_id: Uuid, req: ListItemsRequest) -> Result<Vec<ClothingItem>> {
        let mut clauses = vec!["user_id = $1".to_string()];
        let mut param_count = 2;

        if req.category.is_some() {
            clauses.push(format!("category = ${}", param_count));
            param_count += 1;
        }
        if req.favorites_only {
            clauses.push("is_favorite".to_string());
        }

        let query = format!(
            "SELECT {} FROM wardrobe_item WHERE {} ORDER BY created_at_utc DESC, id DESC LIMIT ${} OFFSET ${}",
            ITEM_COLUMNS,
            clauses.join(" AND "),
            param_count,
            param_count + 1
        );

        let mut q = sqlx::query(&query).bind(user_id);
        if let Some(category) = &req.category {
            q = q.bind(category.as_str());
        }
        let limit = req.limit.unwrap_or(defaults::PAGE_LIMIT);

        let rows = q
            .bind(limit)
            .bind(req.offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "items",
            op = "list",
            user_id = %user_id,
            result_count = rows.len(),
            "Listed clothing items"
        );
        rows.iter().map(row_to_item).collect()
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateItemRequest,
    ) -> Result<ClothingItem> {
        if req.is_empty() {
            return self.fetch(user_id, id).await;
        }
        req.validate()?;

        // Build dynamic update query
        let mut updates = vec!["updated_at_utc = $1".to_string()];
        let mut param_count = 2;

        if req.name.is_some() {
            updates.push(format!("name = ${}", param_count));
            param_count += 1;
        }
        if req.category.is_some() {
            updates.push(format!("category = ${}", param_count));
            param_count += 1;
        }
        if req.color.is_some() {
            updates.push(format!("color = ${}", param_count));
            param_count += 1;
        }
        if req.purchase_link.is_some() {
            updates.push(format!("purchase_link = ${}", param_count));
            param_count += 1;
        }

        let query = format!(
            "UPDATE wardrobe_item SET {} WHERE id = ${} AND user_id = ${} RETURNING {}",
            updates.join(", "),
            param_count,
            param_count + 1,
            ITEM_COLUMNS
        );

        let mut q = sqlx::query(&query).bind(Utc::now());
        if let Some(name) = &req.name {
            q = q.bind(name.trim());
        }
        if let Some(category) = &req.category {
            q = q.bind(category.as_str());
        }
        if let Some(color) = &req.color {
            q = q.bind(color.trim());
        }
        if let Some(link) = &req.purchase_link {
            q = q.bind(link.as_deref().map(str::trim));
        }

        let row = q
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        match row {
            Some(r) => {
                info!(
                    subsystem = "db",
                    component = "items",
                    op = "update",
                    item_id = %id,
                    "Clothing item updated"
                );
                row_to_item(&r)
            }
            None => Err(Error::ItemNotFound(id)),
        }
    }

    async fn set_favorite(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_favorite: bool,
    ) -> Result<ClothingItem> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE wardrobe_item SET is_favorite = $1, updated_at_utc = $2
            WHERE id = $3 AND user_id = $4
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(is_favorite)
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(r) => row_to_item(&r),
            None => Err(Error::ItemNotFound(id)),
        }
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM wardrobe_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let deleted = result.rows_affected() > 0;
        info!(
            subsystem = "db",
            component = "items",
            op = "delete",
            item_id = %id,
            deleted,
            "Clothing item delete"
        );
        Ok(deleted)
    }
}
