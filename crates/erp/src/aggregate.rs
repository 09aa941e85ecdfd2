//! Pure aggregations over decoded ERP rows.
//!
//! Sums are accumulated unrounded; `round_money` is applied once per output value.

use std::collections::{BTreeMap, HashMap};

use aria_core::domain::customer::{Customer, CustomerListing};
use aria_core::domain::dashboard::DashboardRollup;
use aria_core::domain::inventory::{InventorySnapshot, StockItem};
use aria_core::domain::order::{OrderListing, OrderSummary};
use aria_core::domain::product::{ProductId, TopProduct};
use aria_core::domain::sales::{DailySales, SalesSummary, RECENT_ORDERS_IN_SUMMARY};
use aria_core::money::round_money;

use crate::error::ErpError;
use crate::records::{RawOrderLine, RawPartner, RawProduct, RawSaleOrder};

/// `orders` must be in ascending `date_order` order.
pub fn summarize_sales(window_days: u32, orders: Vec<RawSaleOrder>) -> Result<SalesSummary, ErpError> {
    let mut daily: BTreeMap<String, f64> = BTreeMap::new();
    let mut total = 0.0;

    for order in &orders {
        let date_order = order.date_order.as_deref().ok_or_else(|| {
            ErpError::Decode(format!("sale.order `{}` has no date_order", order.name))
        })?;
        let day = date_order.get(..10).unwrap_or(date_order);
        *daily.entry(day.to_string()).or_insert(0.0) += order.amount_total;
        total += order.amount_total;
    }

    let order_count = orders.len();
    let average_order_value =
        if order_count == 0 { 0.0 } else { round_money(total / order_count as f64) };

    let recent_orders = orders
        .into_iter()
        .rev()
        .take(RECENT_ORDERS_IN_SUMMARY)
        .map(OrderSummary::from)
        .collect();

    Ok(SalesSummary {
        window_days,
        total: round_money(total),
        order_count,
        average_order_value,
        daily: daily
            .into_iter()
            .map(|(date, amount)| DailySales { date, total: round_money(amount) })
            .collect(),
        recent_orders,
    })
}

/// Groups lines by product and ranks by quantity. Ties keep first-seen order.
pub fn rank_top_products(lines: Vec<RawOrderLine>, limit: usize) -> Vec<TopProduct> {
    let mut ranked: Vec<TopProduct> = Vec::new();
    let mut positions: HashMap<i64, usize> = HashMap::new();

    for line in lines {
        let Some(product) = line.product_id else {
            continue;
        };
        let position = *positions.entry(product.id).or_insert_with(|| {
            ranked.push(TopProduct {
                product_id: ProductId(product.id),
                name: product.name.clone(),
                quantity: 0.0,
                revenue: 0.0,
            });
            ranked.len() - 1
        });
        let entry = &mut ranked[position];
        entry.quantity += line.product_uom_qty;
        entry.revenue += line.price_subtotal;
    }

    ranked.sort_by(|left, right| right.quantity.total_cmp(&left.quantity));
    ranked.truncate(limit);
    for entry in &mut ranked {
        entry.quantity = round_money(entry.quantity);
        entry.revenue = round_money(entry.revenue);
    }
    ranked
}

pub fn snapshot_inventory(products: Vec<RawProduct>) -> InventorySnapshot {
    let items: Vec<StockItem> = products.into_iter().map(StockItem::from).collect();
    let total_value: f64 = items.iter().map(StockItem::value).sum();
    let low_stock = items.iter().filter(|item| item.is_low_stock()).cloned().collect();

    InventorySnapshot {
        product_count: items.len(),
        total_value: round_money(total_value),
        low_stock,
        items,
    }
}

pub fn list_customers(partners: Vec<RawPartner>) -> CustomerListing {
    CustomerListing::new(partners.into_iter().map(Customer::from).collect())
}

pub fn list_orders(orders: Vec<RawSaleOrder>) -> OrderListing {
    OrderListing { orders: orders.into_iter().map(OrderSummary::from).collect() }
}

pub fn rollup(
    sales: &SalesSummary,
    inventory: &InventorySnapshot,
    customers: &CustomerListing,
) -> DashboardRollup {
    DashboardRollup {
        sales_total: sales.total,
        order_count: sales.order_count,
        inventory_product_count: inventory.product_count,
        inventory_value: inventory.total_value,
        low_stock_count: inventory.low_stock.len(),
        customer_count: customers.total,
    }
}

#[cfg(test)]
mod tests {
    use super::{rank_top_products, snapshot_inventory, summarize_sales};
    use crate::records::{Many2One, RawOrderLine, RawProduct, RawSaleOrder};

    fn order(id: i64, date: Option<&str>, amount: f64) -> RawSaleOrder {
        RawSaleOrder {
            id,
            name: format!("S{id:05}"),
            date_order: date.map(ToString::to_string),
            partner_id: Some(Many2One { id: 1, name: "Comercial Andes".to_string() }),
            amount_total: amount,
            state: "sale".to_string(),
        }
    }

    fn line(product: Option<(i64, &str)>, quantity: f64, subtotal: f64) -> RawOrderLine {
        RawOrderLine {
            product_id: product.map(|(id, name)| Many2One { id, name: name.to_string() }),
            product_uom_qty: quantity,
            price_subtotal: subtotal,
        }
    }

    fn product(id: i64, quantity: f64, price: f64) -> RawProduct {
        RawProduct {
            id,
            name: format!("Producto {id}"),
            qty_available: quantity,
            list_price: price,
            categ_id: None,
        }
    }

    #[test]
    fn daily_series_sums_to_total() {
        let orders = vec![
            order(1, Some("2026-10-01 09:00:00"), 100.10),
            order(2, Some("2026-10-01 15:30:00"), 250.25),
            order(3, Some("2026-10-03 11:00:00"), 19.99),
            order(4, Some("2026-10-07 08:45:00"), 1030.01),
        ];

        let summary = summarize_sales(30, orders).expect("orders have dates");
        let daily_sum: f64 = summary.daily.iter().map(|day| day.total).sum();

        assert_eq!(summary.order_count, 4);
        assert_eq!(summary.total, 1400.35);
        assert!((daily_sum - summary.total).abs() <= 0.01);
        assert_eq!(
            summary.daily.iter().map(|day| day.date.as_str()).collect::<Vec<_>>(),
            vec!["2026-10-01", "2026-10-03", "2026-10-07"]
        );
        assert_eq!(summary.average_order_value, 350.09);
    }

    #[test]
    fn recent_orders_are_last_five_newest_first() {
        let orders = (1..=7)
            .map(|id| order(id, Some(&format!("2026-10-0{id} 10:00:00")), 10.0))
            .collect();

        let summary = summarize_sales(30, orders).expect("orders have dates");
        let ids: Vec<i64> = summary.recent_orders.iter().map(|order| order.id).collect();

        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn empty_window_has_zero_average() {
        let summary = summarize_sales(30, Vec::new()).expect("no orders is fine");

        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.average_order_value, 0.0);
        assert!(summary.daily.is_empty());
        assert!(summary.recent_orders.is_empty());
    }

    #[test]
    fn missing_order_date_is_a_decode_error() {
        let result = summarize_sales(30, vec![order(1, None, 10.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn top_products_are_ranked_and_truncated() {
        let lines = vec![
            line(Some((1, "Tornillo")), 5.0, 5.0),
            line(Some((2, "Martillo")), 8.0, 80.0),
            line(None, 100.0, 1.0),
            line(Some((3, "Clavo")), 8.0, 4.0),
            line(Some((1, "Tornillo")), 1.0, 1.0),
            line(Some((4, "Sierra")), 2.0, 60.0),
        ];

        let ranked = rank_top_products(lines, 3);
        let names: Vec<&str> = ranked.iter().map(|entry| entry.name.as_str()).collect();

        assert_eq!(names, vec!["Martillo", "Clavo", "Tornillo"]);
        assert!(ranked.windows(2).all(|pair| pair[0].quantity >= pair[1].quantity));
        assert_eq!(ranked[2].quantity, 6.0);
        assert_eq!(ranked[2].revenue, 6.0);
    }

    #[test]
    fn low_stock_is_exactly_below_threshold() {
        let snapshot = snapshot_inventory(vec![
            product(1, 3.0, 10.0),
            product(2, 10.0, 1.5),
            product(3, 9.5, 2.0),
            product(4, 40.0, 0.25),
        ]);

        let low: Vec<i64> = snapshot.low_stock.iter().map(|item| item.product_id.0).collect();
        assert_eq!(low, vec![1, 3]);
        assert_eq!(snapshot.product_count, 4);
        assert_eq!(snapshot.total_value, 74.0);
        assert!(snapshot.low_stock.iter().all(|item| snapshot.items.contains(item)));
    }
}
