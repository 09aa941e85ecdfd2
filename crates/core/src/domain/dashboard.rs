use serde::{Deserialize, Serialize};

/// Headline numbers of the 30-day sales summary, the inventory snapshot and the
/// customer listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardRollup {
    pub sales_total: f64,
    pub order_count: usize,
    pub inventory_product_count: usize,
    pub inventory_value: f64,
    pub low_stock_count: usize,
    pub customer_count: usize,
}
