//! # wardrobe-db
//!
//! Storage layer for wardrobe.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repositories for clothing items and saved outfits
//! - A filesystem blob store for item images
//! - An in-memory store implementing the same traits, for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use wardrobe_db::{Database, ClothingItemRepository, ListItemsRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/wardrobe").await?;
//!     let items = db.items.list(user_id, ListItemsRequest::default()).await?;
//!     println!("{} items", items.len());
//!     Ok(())
//! }
//! ```
pub mod file_storage;
pub mod items;
pub mod memory;
pub mod outfits;
pub mod pool;

// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use wardrobe_core::*;

pub use file_storage::{compute_content_hash, FilesystemBackend};
pub use items::PgClothingItemRepository;
pub use memory::{InMemoryStore, StoreCall};
pub use outfits::PgOutfitRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig, PoolStats};

use sqlx::{Pool, Postgres};

/// Combined database handle with all repositories.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
    pub items: PgClothingItemRepository,
    pub outfits: PgOutfitRepository,
}

impl Database {
    /// Create a new Database instance from an existing pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            items: PgClothingItemRepository::new(pool.clone()),
            outfits: PgOutfitRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}
