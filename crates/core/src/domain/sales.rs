use serde::{Deserialize, Serialize};

use crate::domain::order::OrderSummary;

/// Number of orders kept in [`SalesSummary::recent_orders`].
pub const RECENT_ORDERS_IN_SUMMARY: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    /// `YYYY-MM-DD`
    pub date: String,
    pub total: f64,
}

/// Confirmed sales over a trailing window of days.
///
/// `daily` is ordered by date and its totals add up to `total`.
/// `recent_orders` holds the newest orders first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub window_days: u32,
    pub total: f64,
    pub order_count: usize,
    pub average_order_value: f64,
    pub daily: Vec<DailySales>,
    pub recent_orders: Vec<OrderSummary>,
}
