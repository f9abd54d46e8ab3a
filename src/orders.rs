//! Outbound supplier documents: the reorder message shared over WhatsApp
//! and the printable purchase order.
//!
//! Everything is assembled from already-fetched data; the only ambient
//! inputs are the clock (order date and number).

use std::collections::HashMap;

use crate::models::product::{ProductWithMarkets, StockStatus};
use crate::models::{category, supplier};

/// VAT applied on purchase orders.
pub const VAT_RATE: f64 = 0.20;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Status label as shown on stock cards and reorder lists.
pub fn status_label(status: StockStatus) -> &'static str {
    match status {
        StockStatus::Available => "Disponible",
        StockStatus::Low => "Presque fini",
        StockStatus::Out => "Épuisé",
    }
}

/// Products that need reordering from this list.
pub fn critical_products(products: &[ProductWithMarkets]) -> Vec<ProductWithMarkets> {
    products
        .iter()
        .filter(|p| p.status.needs_reorder())
        .cloned()
        .collect()
}

/// Preformatted reorder summary, one bullet per critical product.
pub fn restock_message(supplier: &supplier::Model, critical: &[ProductWithMarkets]) -> String {
    let product_list = critical
        .iter()
        .map(|p| format!("• {} ({})", p.name, status_label(p.status)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🛒 Liste de réapprovisionnement\n\nFournisseur: {}\n\nProduits à commander:\n{}",
        supplier.name, product_list
    )
}

/// `tel:` link for the call button.
pub fn dial_link(phone_number: &str) -> String {
    format!("tel:{}", phone_number)
}

/// WhatsApp deep link carrying the message. The number keeps digits only,
/// the message is percent-encoded.
pub fn whatsapp_link(phone_number: &str, message: &str) -> String {
    let digits: String = phone_number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    format!("https://wa.me/{}?text={}", digits, urlencoding::encode(message))
}

/// Buyer identity printed on purchase orders.
#[derive(Debug, Clone)]
pub struct Company {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Default for Company {
    fn default() -> Self {
        Self {
            name: "Mon Étal".to_string(),
            address: "123 Rue du Commerce".to_string(),
            phone: "+33 1 23 45 67 89".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderLine {
    pub name: String,
    pub category: Option<String>,
    pub status: StockStatus,
    pub unit_price: f64,
}

#[derive(Debug, Clone)]
pub struct PurchaseOrder {
    pub order_number: String,
    pub date: String,
    pub supplier_name: String,
    pub supplier_phone: Option<String>,
    pub company: Company,
    pub lines: Vec<OrderLine>,
    pub total_ht: f64,
    pub tva: f64,
    pub total_ttc: f64,
}

/// Assemble a purchase order for the given products. Callers pass the
/// critical subset; nothing here re-filters.
pub fn build_purchase_order(
    supplier: &supplier::Model,
    products: &[ProductWithMarkets],
    categories: &[category::Model],
) -> PurchaseOrder {
    let category_names: HashMap<i32, &str> =
        categories.iter().map(|c| (c.id, c.name.as_str())).collect();

    let lines: Vec<OrderLine> = products
        .iter()
        .map(|p| OrderLine {
            name: p.name.clone(),
            category: p
                .category_id
                .and_then(|id| category_names.get(&id))
                .map(|name| name.to_string()),
            status: p.status,
            unit_price: p.purchase_price.unwrap_or(0.0),
        })
        .collect();

    let total_ht: f64 = lines.iter().map(|l| l.unit_price).sum();
    let tva = total_ht * VAT_RATE;
    let total_ttc = total_ht + tva;

    let now = chrono::Utc::now();

    PurchaseOrder {
        order_number: format!("CMD-{}", now.timestamp_millis()),
        date: now.format("%d/%m/%Y").to_string(),
        supplier_name: supplier.name.clone(),
        supplier_phone: supplier.phone_number.clone(),
        company: Company::default(),
        lines,
        total_ht,
        tva,
        total_ttc,
    }
}

impl PurchaseOrder {
    /// Printable text document, laid out for a fixed-width font.
    pub fn render_text(&self) -> String {
        let mut doc = String::new();

        doc.push_str("╔════════════════════════════════════════════════════════════╗\n");
        doc.push_str("║                    BON DE COMMANDE                         ║\n");
        doc.push_str("╚════════════════════════════════════════════════════════════╝\n");
        doc.push('\n');
        doc.push_str(&format!("Date: {}\n", self.date));
        doc.push_str(&format!("N° Commande: {}\n", self.order_number));
        doc.push('\n');
        doc.push_str(RULE);
        doc.push_str("\n\n");

        doc.push_str("FOURNISSEUR:\n");
        doc.push_str(&format!("{}\n", self.supplier_name));
        doc.push_str(&format!(
            "{}\n",
            self.supplier_phone.as_deref().unwrap_or("")
        ));
        doc.push('\n');

        doc.push_str("ENTREPRISE:\n");
        doc.push_str(&format!("{}\n", self.company.name));
        doc.push_str(&format!("{}\n", self.company.address));
        doc.push_str(&format!("{}\n", self.company.phone));
        doc.push('\n');
        doc.push_str(RULE);
        doc.push_str("\n\n");

        doc.push_str("PRODUITS À COMMANDER:\n");
        for (i, line) in self.lines.iter().enumerate() {
            doc.push('\n');
            doc.push_str(&format!("  {}. {}\n", i + 1, line.name));
            doc.push_str(&format!(
                "     Catégorie: {}\n",
                line.category.as_deref().unwrap_or("N/A")
            ));
            let state = match line.status {
                StockStatus::Out => "❌ Épuisé",
                _ => "⚠️ Presque fini",
            };
            doc.push_str(&format!("     État: {}\n", state));
            doc.push_str(&format!(
                "     Prix unitaire HT: {:.2} €\n",
                line.unit_price
            ));
        }
        doc.push('\n');
        doc.push_str(RULE);
        doc.push_str("\n\n");

        doc.push_str("RÉCAPITULATIF:\n\n");
        doc.push_str(&format!("Total HT:           {:.2} €\n", self.total_ht));
        doc.push_str(&format!("TVA (20%):          {:.2} €\n", self.tva));
        doc.push_str("                    ─────────────────\n");
        doc.push_str(&format!("Total TTC:          {:.2} €\n", self.total_ttc));
        doc.push('\n');
        doc.push_str(RULE);
        doc.push_str("\n\n");

        doc.push_str("Signature client:                    Signature fournisseur:\n");
        doc.push_str("\n\n\n");
        doc.push_str("_________________                    _________________\n");
        doc.push('\n');
        doc.push_str(RULE);
        doc.push_str("\n\n");

        doc.push_str("Merci pour votre service !\n");

        doc
    }
}
