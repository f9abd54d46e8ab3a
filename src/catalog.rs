//! Stock and catalogue view logic.
//!
//! Everything here is pure and synchronous: the handlers fetch the product
//! list once, then narrow it with these predicates in memory. Keeping the
//! filters out of SQL means every screen works off the same cached fetch.

use crate::models::product::{ProductWithMarkets, StockStatus};

/// Market selection on the stock screen. `Any` covers both "no selection"
/// and the explicit "all markets" choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketFilter {
    #[default]
    Any,
    Only(i32),
}

impl MarketFilter {
    pub fn matches(&self, product: &ProductWithMarkets) -> bool {
        match self {
            MarketFilter::Any => true,
            MarketFilter::Only(id) => product.market_ids.contains(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(i32),
}

impl CategoryFilter {
    pub fn matches(&self, product: &ProductWithMarkets) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(id) => product.category_id == Some(*id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Low,
    Out,
}

impl StatusFilter {
    pub fn matches(&self, product: &ProductWithMarkets) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Low => product.status == StockStatus::Low,
            StatusFilter::Out => product.status == StockStatus::Out,
        }
    }
}

/// Product set supplier alert counts are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertScope {
    All,
    Market(i32),
}

impl AlertScope {
    fn matches(&self, product: &ProductWithMarkets) -> bool {
        match self {
            AlertScope::All => true,
            AlertScope::Market(id) => product.market_ids.contains(id),
        }
    }
}

/// Case-insensitive substring match on the product name. An empty query
/// matches everything.
pub fn name_matches(product: &ProductWithMarkets, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    product.name.to_lowercase().contains(&query.to_lowercase())
}

/// Catalogue search also looks at the product code. Products without a code
/// only match on name.
pub fn code_matches(product: &ProductWithMarkets, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    match &product.code {
        Some(code) => code.to_lowercase().contains(&query.to_lowercase()),
        None => false,
    }
}

/// Catalogue display order: ascending by code, case-insensitive. Products
/// without a code sort first. The sort is stable, so same-code products keep
/// their fetch order.
pub fn catalogue_order(products: &mut [ProductWithMarkets]) {
    products.sort_by_key(|p| p.code.as_deref().unwrap_or("").to_lowercase());
}

/// Gross margin in percent, rounded to one decimal.
///
/// Undefined (`None`) when either price is missing or the sale price is
/// zero; callers render a dash rather than a number in that case.
pub fn margin_percent(purchase_price: Option<f64>, sale_price: Option<f64>) -> Option<f64> {
    let purchase = purchase_price?;
    let sale = sale_price?;
    if sale == 0.0 {
        return None;
    }
    Some(((sale - purchase) / sale * 1000.0).round() / 10.0)
}

/// All products of one supplier, within the given alert scope.
pub fn supplier_products(
    products: &[ProductWithMarkets],
    supplier_id: i32,
    scope: AlertScope,
) -> Vec<ProductWithMarkets> {
    products
        .iter()
        .filter(|p| p.supplier_id == Some(supplier_id) && scope.matches(p))
        .cloned()
        .collect()
}

/// How many of a supplier's products need reordering (`low` or `out`),
/// within the given scope. Shown as the alert badge on supplier cards.
pub fn supplier_alert_count(
    products: &[ProductWithMarkets],
    supplier_id: i32,
    scope: AlertScope,
) -> usize {
    products
        .iter()
        .filter(|p| p.supplier_id == Some(supplier_id) && scope.matches(p))
        .filter(|p| p.status.needs_reorder())
        .count()
}

/// Number of distinct products sold on a market. Duplicate links count once.
pub fn market_product_count(products: &[ProductWithMarkets], market_id: i32) -> usize {
    products
        .iter()
        .filter(|p| p.market_ids.contains(&market_id))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, name: &str, status: StockStatus) -> ProductWithMarkets {
        ProductWithMarkets {
            id,
            name: name.to_string(),
            code: None,
            status,
            supplier_id: None,
            category_id: None,
            purchase_price: None,
            sale_price: None,
            market_ids: vec![],
        }
    }

    fn sample() -> Vec<ProductWithMarkets> {
        let mut tomatoes = product(1, "Tomates", StockStatus::Available);
        tomatoes.market_ids = vec![1];
        let mut onions = product(2, "Oignons", StockStatus::Out);
        onions.market_ids = vec![1, 2];
        let mut potatoes = product(3, "Pommes de terre", StockStatus::Out);
        potatoes.market_ids = vec![2];
        let basil = product(4, "Basilic", StockStatus::Low);
        vec![tomatoes, onions, potatoes, basil]
    }

    #[test]
    fn test_name_search_is_case_insensitive() {
        let products = sample();
        let hits: Vec<_> = products.iter().filter(|p| name_matches(p, "tom")).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Tomates");
        assert!(name_matches(&products[0], "TOM"));
        assert!(name_matches(&products[0], ""));
    }

    #[test]
    fn test_status_filter_counts() {
        let products = sample();
        let out: Vec<_> = products
            .iter()
            .filter(|p| StatusFilter::Out.matches(p))
            .collect();
        assert_eq!(out.len(), 2);
        let low: Vec<_> = products
            .iter()
            .filter(|p| StatusFilter::Low.matches(p))
            .collect();
        assert_eq!(low.len(), 1);
        assert_eq!(
            products
                .iter()
                .filter(|p| StatusFilter::All.matches(p))
                .count(),
            4
        );
    }

    #[test]
    fn test_market_filter() {
        let products = sample();
        let on_market_2: Vec<_> = products
            .iter()
            .filter(|p| MarketFilter::Only(2).matches(p))
            .collect();
        assert_eq!(on_market_2.len(), 2);
        assert!(products.iter().all(|p| MarketFilter::Any.matches(p)));
    }

    #[test]
    fn test_filters_are_idempotent() {
        let products = sample();
        let once: Vec<_> = products
            .iter()
            .filter(|p| MarketFilter::Only(1).matches(p))
            .filter(|p| name_matches(p, "o"))
            .cloned()
            .collect();
        let twice: Vec<_> = once
            .iter()
            .filter(|p| MarketFilter::Only(1).matches(p))
            .filter(|p| name_matches(p, "o"))
            .cloned()
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_catalogue_order_puts_missing_codes_first() {
        let mut products = sample();
        products[0].code = Some("LEG-010".to_string());
        products[1].code = Some("leg-002".to_string());
        products[2].code = Some("".to_string());
        // products[3] keeps code = None

        catalogue_order(&mut products);
        let codes: Vec<_> = products.iter().map(|p| p.code.as_deref()).collect();
        assert_eq!(codes, vec![Some(""), None, Some("leg-002"), Some("LEG-010")]);
    }

    #[test]
    fn test_margin_percent() {
        assert_eq!(margin_percent(Some(1.0), Some(2.0)), Some(50.0));
        assert_eq!(margin_percent(Some(2.0), Some(3.0)), Some(33.3));
        // Free stock still has a defined margin
        assert_eq!(margin_percent(Some(0.0), Some(5.0)), Some(100.0));
        // Selling below cost goes negative
        assert_eq!(margin_percent(Some(4.0), Some(2.0)), Some(-100.0));
        assert_eq!(margin_percent(None, Some(2.0)), None);
        assert_eq!(margin_percent(Some(1.0), None), None);
        assert_eq!(margin_percent(Some(1.0), Some(0.0)), None);
    }

    #[test]
    fn test_supplier_alert_count_scopes() {
        let mut products = sample();
        for p in &mut products {
            p.supplier_id = Some(7);
        }
        // Out on markets 1+2, out on market 2, low on no market
        assert_eq!(supplier_alert_count(&products, 7, AlertScope::All), 3);
        assert_eq!(supplier_alert_count(&products, 7, AlertScope::Market(2)), 2);
        assert_eq!(supplier_alert_count(&products, 7, AlertScope::Market(1)), 1);
        assert_eq!(supplier_alert_count(&products, 99, AlertScope::All), 0);
    }

    #[test]
    fn test_market_product_count() {
        let products = sample();
        assert_eq!(market_product_count(&products, 1), 2);
        assert_eq!(market_product_count(&products, 2), 2);
        assert_eq!(market_product_count(&products, 9), 0);
    }
}
