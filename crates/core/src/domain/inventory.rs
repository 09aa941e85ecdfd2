use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// Products with fewer units on hand than this are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub category: Option<String>,
}

impl StockItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }

    pub fn value(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub items: Vec<StockItem>,
    pub product_count: usize,
    pub total_value: f64,
    pub low_stock: Vec<StockItem>,
}
