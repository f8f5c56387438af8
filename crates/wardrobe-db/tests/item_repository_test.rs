//! Integration tests for the PostgreSQL clothing item repository.

use wardrobe_db::test_fixtures::{sample_item, test_database, test_user};
use wardrobe_db::{
    ClothingItemRepository, Database, Error, ItemCategory, ListItemsRequest, UpdateItemRequest,
};
use uuid::Uuid;

/// Load `.env` so `DATABASE_URL` can point at a local test database.
async fn setup() -> Database {
    dotenvy::dotenv().ok();
    test_database().await
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_insert_and_fetch_roundtrip() {
    let db = setup().await;
    let user = test_user();

    let mut req = sample_item("  Oxford shirt ", ItemCategory::Tops);
    req.purchase_link = Some("https://shop.example/oxford".to_string());
    let item = db.items.insert(user, req).await.expect("insert");

    assert_eq!(item.name, "Oxford shirt");
    assert!(!item.is_favorite);

    let fetched = db.items.fetch(user, item.id).await.expect("fetch");
    assert_eq!(fetched.id, item.id);
    assert_eq!(fetched.category, ItemCategory::Tops);
    assert_eq!(
        fetched.purchase_link.as_deref(),
        Some("https://shop.example/oxford")
    );
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_list_is_scoped_and_newest_first() {
    let db = setup().await;
    let user = test_user();
    let other = test_user();

    db.items
        .insert(user, sample_item("First", ItemCategory::Tops))
        .await
        .unwrap();
    let second = db
        .items
        .insert(user, sample_item("Second", ItemCategory::Footwear))
        .await
        .unwrap();
    db.items
        .insert(other, sample_item("Not mine", ItemCategory::Tops))
        .await
        .unwrap();

    let items = db.items.list(user, ListItemsRequest::default()).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, second.id);

    let shoes = db
        .items
        .list(
            user,
            ListItemsRequest {
                category: Some(ItemCategory::Footwear),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(shoes.len(), 1);
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_custom_category_survives_storage() {
    let db = setup().await;
    let user = test_user();

    let item = db
        .items
        .insert(user, sample_item("Silk scarf", "Scarves".parse().unwrap()))
        .await
        .unwrap();
    let fetched = db.items.fetch(user, item.id).await.unwrap();
    assert_eq!(fetched.category, ItemCategory::Other("scarves".to_string()));
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_update_and_clear_purchase_link() {
    let db = setup().await;
    let user = test_user();
    let mut req = sample_item("Chinos", ItemCategory::Bottoms);
    req.purchase_link = Some("https://shop.example/chinos".to_string());
    let item = db.items.insert(user, req).await.unwrap();

    let updated = db
        .items
        .update(
            user,
            item.id,
            UpdateItemRequest {
                color: Some("Khaki".to_string()),
                purchase_link: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.color, "Khaki");
    assert_eq!(updated.name, "Chinos");
    assert!(updated.purchase_link.is_none());
    assert!(updated.updated_at_utc >= item.updated_at_utc);
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_set_favorite_returns_canonical_record() {
    let db = setup().await;
    let user = test_user();
    let item = db
        .items
        .insert(user, sample_item("Loafers", ItemCategory::Footwear))
        .await
        .unwrap();

    let fav = db.items.set_favorite(user, item.id, true).await.unwrap();
    assert!(fav.is_favorite);
    let fav_again = db.items.set_favorite(user, item.id, true).await.unwrap();
    assert!(fav_again.is_favorite);
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_missing_and_foreign_ids() {
    let db = setup().await;
    let user = test_user();
    let item = db
        .items
        .insert(user, sample_item("Belt", ItemCategory::Accessories))
        .await
        .unwrap();

    let err = db.items.fetch(test_user(), item.id).await.unwrap_err();
    assert!(matches!(err, Error::ItemNotFound(id) if id == item.id));

    let err = db
        .items
        .set_favorite(user, Uuid::new_v4(), true)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert!(db.items.delete(user, item.id).await.unwrap());
    assert!(!db.items.delete(user, item.id).await.unwrap());
}
