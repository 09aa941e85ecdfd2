//! Grounding context handed to the model.
//!
//! One line per answer, in Spanish, amounts as `$X,XXX.XX`. Record ids and ERP
//! model names never appear here.

use aria_core::money::format_currency;
use serde::Serialize;

use crate::fetch::{FetchOutcome, FetchedData};

#[derive(Serialize)]
struct ProductLine<'a> {
    producto: &'a str,
    cantidad: f64,
    ingresos: f64,
}

pub fn build_context(outcome: &FetchOutcome) -> String {
    match outcome {
        Ok(data) => describe(data),
        Err(error) => format!("Error: {error}"),
    }
}

fn describe(data: &FetchedData) -> String {
    match data {
        FetchedData::Sales(sales) => format!(
            "VENTAS ({} días): Total {}, {} órdenes, promedio {}",
            sales.window_days,
            format_currency(sales.total),
            sales.order_count,
            format_currency(sales.average_order_value)
        ),
        FetchedData::TopProducts(products) => {
            let lines: Vec<ProductLine<'_>> = products
                .iter()
                .map(|product| ProductLine {
                    producto: &product.name,
                    cantidad: product.quantity,
                    ingresos: product.revenue,
                })
                .collect();
            let listing = serde_json::to_string(&lines).unwrap_or_else(|_| "[]".to_string());
            format!("PRODUCTOS MÁS VENDIDOS: {listing}")
        }
        FetchedData::Inventory(inventory) => format!(
            "INVENTARIO: {} productos, valor {}, {} bajo stock",
            inventory.product_count,
            format_currency(inventory.total_value),
            inventory.low_stock.len()
        ),
        FetchedData::Customers(customers) => format!("CLIENTES: {} activos", customers.total),
        FetchedData::RecentOrders(orders) => {
            format!("ÓRDENES RECIENTES: {} órdenes", orders.orders.len())
        }
        FetchedData::Dashboard(dashboard) => format!(
            "RESUMEN: Ventas {}, {} órdenes, {} productos, {} clientes",
            format_currency(dashboard.sales_total),
            dashboard.order_count,
            dashboard.inventory_product_count,
            dashboard.customer_count
        ),
    }
}

#[cfg(test)]
mod tests {
    use aria_core::domain::customer::CustomerListing;
    use aria_core::domain::dashboard::DashboardRollup;
    use aria_core::domain::inventory::InventorySnapshot;
    use aria_core::domain::product::{ProductId, TopProduct};
    use aria_core::domain::sales::SalesSummary;
    use aria_erp::ErpError;

    use super::build_context;
    use crate::fetch::FetchedData;

    #[test]
    fn sales_line_uses_currency_format() {
        let context = build_context(&Ok(FetchedData::Sales(SalesSummary {
            window_days: 30,
            total: 15230.5,
            order_count: 12,
            average_order_value: 1269.21,
            ..SalesSummary::default()
        })));

        assert_eq!(context, "VENTAS (30 días): Total $15,230.50, 12 órdenes, promedio $1,269.21");
    }

    #[test]
    fn top_products_are_listed_without_ids() {
        let context = build_context(&Ok(FetchedData::TopProducts(vec![TopProduct {
            product_id: ProductId(981),
            name: "Café de altura".to_string(),
            quantity: 42.0,
            revenue: 630.0,
        }])));

        assert_eq!(
            context,
            r#"PRODUCTOS MÁS VENDIDOS: [{"producto":"Café de altura","cantidad":42.0,"ingresos":630.0}]"#
        );
        assert!(!context.contains("981"));
    }

    #[test]
    fn inventory_and_customers_report_counts() {
        let inventory = build_context(&Ok(FetchedData::Inventory(InventorySnapshot {
            product_count: 37,
            total_value: 98765.4,
            ..InventorySnapshot::default()
        })));
        let customers =
            build_context(&Ok(FetchedData::Customers(CustomerListing::new(Vec::new()))));

        assert_eq!(inventory, "INVENTARIO: 37 productos, valor $98,765.40, 0 bajo stock");
        assert_eq!(customers, "CLIENTES: 0 activos");
    }

    #[test]
    fn failure_becomes_error_line() {
        let context = build_context(&Err(ErpError::Transport("connection refused".to_string())));
        assert_eq!(context, "Error: ERP transport failure: connection refused");
    }

    #[test]
    fn dashboard_headline_numbers_round_trip() {
        let rollup = DashboardRollup {
            sales_total: 1234567.89,
            order_count: 321,
            inventory_product_count: 45,
            inventory_value: 999.0,
            low_stock_count: 3,
            customer_count: 5,
        };

        let context = build_context(&Ok(FetchedData::Dashboard(rollup.clone())));
        let parsed = parse_dashboard(&context).expect("context should parse");

        assert_eq!(
            parsed,
            (
                rollup.sales_total,
                rollup.order_count,
                rollup.inventory_product_count,
                rollup.customer_count
            )
        );
    }

    fn parse_dashboard(context: &str) -> Option<(f64, usize, usize, usize)> {
        let body = context.strip_prefix("RESUMEN: Ventas $")?;
        let mut parts = body.split(", ");
        let sales = parts.next()?.replace(',', "").parse().ok()?;
        let orders = parts.next()?.strip_suffix(" órdenes")?.parse().ok()?;
        let products = parts.next()?.strip_suffix(" productos")?.parse().ok()?;
        let customers = parts.next()?.strip_suffix(" clientes")?.parse().ok()?;
        Some((sales, orders, products, customers))
    }
}
