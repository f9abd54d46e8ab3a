use crate::models::{category, market, product, product_market, supplier};
use sea_orm::*;

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Re-running against a populated catalogue would duplicate products
    let existing = product::Entity::find().count(db).await?;
    if existing > 0 {
        tracing::info!("Catalogue already holds {} products, skipping seed", existing);
        return Ok(());
    }

    let now = chrono::Utc::now().to_rfc3339();

    // 1. Categories
    let mut category_ids = Vec::new();
    for name in ["Fruits", "Légumes", "Épices", "Herbes"] {
        let row = category::ActiveModel {
            name: Set(name.to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let res = category::Entity::insert(row).exec(db).await?;
        category_ids.push(res.last_insert_id);
    }

    // 2. Markets
    let mut market_ids = Vec::new();
    for name in ["Marché Central", "Marché de Quartier"] {
        let row = market::ActiveModel {
            name: Set(name.to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let res = market::Entity::insert(row).exec(db).await?;
        market_ids.push(res.last_insert_id);
    }

    // 3. Suppliers, one of them without a phone number
    let mut supplier_ids = Vec::new();
    for (name, phone) in [
        ("Ferme Dubois", Some("+33 6 12 34 56 78")),
        ("Coopérative du Sud", None),
    ] {
        let row = supplier::ActiveModel {
            name: Set(name.to_owned()),
            phone_number: Set(phone.map(str::to_owned)),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let res = supplier::Entity::insert(row).exec(db).await?;
        supplier_ids.push(res.last_insert_id);
    }

    // 4. Products covering the three stock statuses
    let rows = [
        ("Tomates anciennes", Some("TOM-01"), "available", Some(0), Some(1), Some(2.50), Some(4.90)),
        ("Pommes Gala", Some("POM-12"), "low", Some(0), Some(0), Some(1.20), Some(2.50)),
        ("Safran en filaments", Some("SAF-01"), "out", Some(1), Some(2), Some(450.0), Some(799.0)),
        ("Basilic frais", None, "available", Some(1), Some(3), Some(0.80), Some(1.50)),
        ("Sacs en papier", Some("EMB-05"), "low", None, None, Some(0.05), None),
    ];

    let mut product_ids = Vec::new();
    for (name, code, status, supplier_idx, category_idx, purchase, sale) in rows {
        let row = product::ActiveModel {
            name: Set(name.to_owned()),
            code: Set(code.map(str::to_owned)),
            status: Set(status.to_owned()),
            supplier_id: Set(supplier_idx.map(|i: usize| supplier_ids[i])),
            category_id: Set(category_idx.map(|i: usize| category_ids[i])),
            purchase_price: Set(purchase),
            sale_price: Set(sale),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        let res = product::Entity::insert(row).exec(db).await?;
        product_ids.push(res.last_insert_id);
    }

    // 5. Market links: first two products on both markets, saffron on the second
    let links = [
        (product_ids[0], market_ids[0]),
        (product_ids[0], market_ids[1]),
        (product_ids[1], market_ids[0]),
        (product_ids[1], market_ids[1]),
        (product_ids[2], market_ids[1]),
        (product_ids[3], market_ids[0]),
    ];
    for (product_id, market_id) in links {
        let row = product_market::ActiveModel {
            product_id: Set(product_id),
            market_id: Set(market_id),
            ..Default::default()
        };
        product_market::Entity::insert(row).exec(db).await?;
    }

    Ok(())
}
