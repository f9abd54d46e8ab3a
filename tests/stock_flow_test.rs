use etal::db;
use etal::domain::DomainError;
use etal::import;
use etal::models::{StockStatus, product_market};
use etal::services::category_service;
use etal::services::market_service;
use etal::services::product_service::{self, NewProduct, ProductSync, ProductUpdate};
use etal::services::supplier_service::{self, SupplierInput};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, Statement,
};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite for testing
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// The import path inserts rows concurrently, which can check out a second
// pooled connection. A second connection to sqlite::memory: sees its own
// empty database, so tests covering that path get a throwaway file.
async fn setup_file_db(tag: &str) -> (DatabaseConnection, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("etal_{}_{}.db", tag, std::process::id()));
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = db::init_db(&url).await.expect("Failed to init DB");
    (db, path)
}

async fn create_test_market(db: &DatabaseConnection, name: &str) -> i32 {
    market_service::create_market(db, name)
        .await
        .expect("Failed to create market")
        .id
}

async fn create_test_supplier(db: &DatabaseConnection, name: &str, phone: Option<&str>) -> i32 {
    supplier_service::create_supplier(
        db,
        SupplierInput {
            name: name.to_string(),
            phone_number: phone.map(str::to_string),
        },
    )
    .await
    .expect("Failed to create supplier")
    .id
}

async fn create_test_category(db: &DatabaseConnection, name: &str) -> i32 {
    category_service::create_category(db, name)
        .await
        .expect("Failed to create category")
        .id
}

async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    market_id: Option<i32>,
) -> etal::models::ProductWithMarkets {
    product_service::create_product(
        db,
        NewProduct {
            name: name.to_string(),
            market_id,
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create product")
}

#[tokio::test]
async fn test_fetch_products_merges_market_links() {
    let db = setup_test_db().await;
    let market_id = create_test_market(&db, "Marché Central").await;

    let linked = create_test_product(&db, "Tomates", Some(market_id)).await;
    let unlinked = create_test_product(&db, "Pommes", None).await;

    let products = product_service::fetch_products(&db).await.expect("fetch failed");
    assert_eq!(products.len(), 2);

    let tomates = products.iter().find(|p| p.id == linked.id).unwrap();
    assert_eq!(tomates.market_ids, vec![market_id]);

    let pommes = products.iter().find(|p| p.id == unlinked.id).unwrap();
    assert!(pommes.market_ids.is_empty());
}

#[tokio::test]
async fn test_fetch_degrades_when_link_table_is_gone() {
    let db = setup_test_db().await;
    let market_id = create_test_market(&db, "Marché Central").await;
    create_test_product(&db, "Tomates", Some(market_id)).await;

    // Make the link query fail while the product query still works
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "DROP TABLE product_markets".to_owned(),
    ))
    .await
    .expect("Failed to drop link table");

    // Core assertion: products still come back, just without market links
    let products = product_service::fetch_products(&db).await.expect("fetch failed");
    assert_eq!(products.len(), 1);
    assert!(products[0].market_ids.is_empty());
}

#[tokio::test]
async fn test_create_product_requires_name() {
    let db = setup_test_db().await;

    let result = product_service::create_product(
        &db,
        NewProduct {
            name: "   ".to_string(),
            ..Default::default()
        },
    )
    .await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_create_with_unknown_market_keeps_product() {
    let db = setup_test_db().await;

    // The market does not exist, so the link insert hits the foreign key
    let product = product_service::create_product(
        &db,
        NewProduct {
            name: "Tomates".to_string(),
            market_id: Some(9999),
            ..Default::default()
        },
    )
    .await
    .expect("create should succeed without the link");

    // Core assertion: the product row survives, only the link is missing
    assert!(product.market_ids.is_empty());
    let fetched = product_service::get_product(&db, product.id)
        .await
        .expect("product should exist");
    assert_eq!(fetched.name, "Tomates");
    assert!(fetched.market_ids.is_empty());
}

#[tokio::test]
async fn test_update_replaces_market_links() {
    let db = setup_test_db().await;
    let m1 = create_test_market(&db, "Marché Central").await;
    let m2 = create_test_market(&db, "Marché de Quartier").await;
    let m3 = create_test_market(&db, "Marché Bio").await;

    let product = create_test_product(&db, "Tomates", Some(m1)).await;

    let sync = product_service::update_product(
        &db,
        product.id,
        ProductUpdate {
            name: "Tomates".to_string(),
            code: None,
            status: StockStatus::Available,
            supplier_id: None,
            category_id: None,
            market_ids: vec![m2, m3],
            purchase_price: None,
            sale_price: None,
        },
    )
    .await
    .expect("update failed");
    assert_eq!(sync, ProductSync::Replaced);

    let updated = product_service::get_product(&db, product.id).await.unwrap();
    let mut ids = updated.market_ids.clone();
    ids.sort();
    assert_eq!(ids, vec![m2, m3]);
}

#[tokio::test]
async fn test_update_with_unknown_market_keeps_previous_links() {
    let db = setup_test_db().await;
    let m1 = create_test_market(&db, "Marché Central").await;
    let product = create_test_product(&db, "Tomates", Some(m1)).await;

    // One of the desired markets does not exist, so the batch insert fails
    // and the snapshot goes back in
    let sync = product_service::update_product(
        &db,
        product.id,
        ProductUpdate {
            name: "Tomates anciennes".to_string(),
            code: None,
            status: StockStatus::Low,
            supplier_id: None,
            category_id: None,
            market_ids: vec![m1, 9999],
            purchase_price: None,
            sale_price: None,
        },
    )
    .await
    .expect("update itself should not error");
    assert!(matches!(sync, ProductSync::KeptPrevious { .. }));

    // Core assertions: scalars are updated, links are the previous set
    let updated = product_service::get_product(&db, product.id).await.unwrap();
    assert_eq!(updated.name, "Tomates anciennes");
    assert_eq!(updated.status, StockStatus::Low);
    assert_eq!(updated.market_ids, vec![m1]);
}

#[tokio::test]
async fn test_update_missing_product_is_not_found() {
    let db = setup_test_db().await;

    let result = product_service::update_product(
        &db,
        4242,
        ProductUpdate {
            name: "Fantôme".to_string(),
            code: None,
            status: StockStatus::Available,
            supplier_id: None,
            category_id: None,
            market_ids: Vec::new(),
            purchase_price: None,
            sale_price: None,
        },
    )
    .await;

    assert!(matches!(result, Err(DomainError::NotFound)));
}

#[tokio::test]
async fn test_update_product_status() {
    let db = setup_test_db().await;
    let product = create_test_product(&db, "Tomates", None).await;
    assert_eq!(product.status, StockStatus::Available);

    let updated = product_service::update_product_status(&db, product.id, StockStatus::Low)
        .await
        .expect("status update failed");
    assert_eq!(updated.status, StockStatus::Low);

    let missing = product_service::update_product_status(&db, 4242, StockStatus::Out).await;
    assert!(matches!(missing, Err(DomainError::NotFound)));
}

#[tokio::test]
async fn test_delete_product_cascades_links() {
    let db = setup_test_db().await;
    let m1 = create_test_market(&db, "Marché Central").await;
    let product = create_test_product(&db, "Tomates", Some(m1)).await;

    product_service::delete_product(&db, product.id)
        .await
        .expect("delete failed");

    let remaining = product_market::Entity::find()
        .filter(product_market::Column::ProductId.eq(product.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(remaining, 0, "links should cascade with the product");
}

#[tokio::test]
async fn test_market_delete_blocked_while_products_linked() {
    let db = setup_test_db().await;
    let market_id = create_test_market(&db, "Marché Central").await;
    let product = create_test_product(&db, "Tomates", Some(market_id)).await;

    // 1. Delete refused while a product is linked
    let blocked = market_service::delete_market(&db, market_id).await;
    match blocked {
        Err(DomainError::Conflict(msg)) => {
            assert!(msg.contains("1 produit(s)"), "unexpected message: {}", msg);
        }
        other => panic!("expected Conflict, got {:?}", other),
    }

    // 2. After the product goes, the delete proceeds
    product_service::delete_product(&db, product.id).await.unwrap();
    market_service::delete_market(&db, market_id)
        .await
        .expect("delete should succeed once unlinked");

    let markets = market_service::fetch_markets(&db).await.unwrap();
    assert!(markets.is_empty());
}

#[tokio::test]
async fn test_market_delete_counts_distinct_products() {
    let db = setup_test_db().await;
    let market_id = create_test_market(&db, "Marché Central").await;
    let product = create_test_product(&db, "Tomates", Some(market_id)).await;

    // Second link for the same pair; nothing forbids it
    let duplicate = product_market::ActiveModel {
        product_id: Set(product.id),
        market_id: Set(market_id),
        ..Default::default()
    };
    product_market::Entity::insert(duplicate)
        .exec(&db)
        .await
        .expect("duplicate link insert failed");

    // Core assertion: two links, but one distinct product in the message
    let blocked = market_service::delete_market(&db, market_id).await;
    match blocked {
        Err(DomainError::Conflict(msg)) => {
            assert!(msg.contains("1 produit(s)"), "unexpected message: {}", msg);
        }
        other => panic!("expected Conflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_supplier_delete_clears_product_reference() {
    let db = setup_test_db().await;
    let supplier_id = create_test_supplier(&db, "Ferme Dubois", Some("+33 6 12 34 56 78")).await;

    let product = product_service::create_product(
        &db,
        NewProduct {
            name: "Tomates".to_string(),
            supplier_id: Some(supplier_id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(product.supplier_id, Some(supplier_id));

    supplier_service::delete_supplier(&db, supplier_id)
        .await
        .expect("supplier delete failed");

    // Core assertion: the product stays, its supplier reference is cleared
    let orphaned = product_service::get_product(&db, product.id).await.unwrap();
    assert_eq!(orphaned.supplier_id, None);
}

#[tokio::test]
async fn test_duplicate_market_links_are_kept() {
    let db = setup_test_db().await;
    let market_id = create_test_market(&db, "Marché Central").await;
    let product = create_test_product(&db, "Tomates", Some(market_id)).await;

    let duplicate = product_market::ActiveModel {
        product_id: Set(product.id),
        market_id: Set(market_id),
        ..Default::default()
    };
    product_market::Entity::insert(duplicate)
        .exec(&db)
        .await
        .expect("duplicate link insert failed");

    let fetched = product_service::get_product(&db, product.id).await.unwrap();
    assert_eq!(fetched.market_ids, vec![market_id, market_id]);
}

#[tokio::test]
async fn test_csv_import_creates_products() {
    let (db, path) = setup_file_db("import").await;

    create_test_category(&db, "Fruits").await;
    let supplier_id = create_test_supplier(&db, "Ferme Dubois", None).await;
    let market_id = create_test_market(&db, "Marché Central").await;

    let csv = "name,category,supplier,market,status,purchase_price,sale_price\n\
Tomates,Fruits,Ferme Dubois,Marché Central,low,1.50,3.00\n\
,Fruits,,,,,\n\
Pommes,,,,,,\n\
Oranges,fruits,Inconnu,,out,2,4\n\
Bananes,Fruits,,,bientôt,,\n\
Kiwis,Exotique,,,low,,\n";

    let report = import::import_products(&db, csv.as_bytes())
        .await
        .expect("import failed");

    assert_eq!(report.total_rows, 6);
    assert_eq!(report.imported, 3);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.failed, 0);

    let products = product_service::fetch_products(&db).await.unwrap();
    assert_eq!(products.len(), 3);

    let tomates = products.iter().find(|p| p.name == "Tomates").unwrap();
    assert_eq!(tomates.status, StockStatus::Low);
    assert_eq!(tomates.supplier_id, Some(supplier_id));
    assert_eq!(tomates.market_ids, vec![market_id]);
    assert_eq!(tomates.purchase_price, Some(1.5));
    assert_eq!(tomates.sale_price, Some(3.0));

    let oranges = products.iter().find(|p| p.name == "Oranges").unwrap();
    assert_eq!(oranges.status, StockStatus::Out);
    assert_eq!(oranges.supplier_id, None, "unknown supplier degrades to none");

    let bananes = products.iter().find(|p| p.name == "Bananes").unwrap();
    assert_eq!(bananes.status, StockStatus::Available, "unknown status falls back");

    let _ = std::fs::remove_file(&path);
}
