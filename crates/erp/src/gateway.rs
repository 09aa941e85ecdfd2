use aria_core::domain::customer::CustomerListing;
use aria_core::domain::dashboard::DashboardRollup;
use aria_core::domain::inventory::InventorySnapshot;
use aria_core::domain::order::OrderListing;
use aria_core::domain::product::TopProduct;
use aria_core::domain::sales::SalesSummary;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use crate::aggregate;
use crate::error::ErpError;
use crate::query::{SearchDomain, SearchOptions};
use crate::records::{decode_records, RawOrderLine, RawPartner, RawProduct, RawSaleOrder};
use crate::session::SessionId;

const ORDER_LINE_SCAN_LIMIT: u32 = 1000;
const INVENTORY_SCAN_LIMIT: u32 = 50;

/// The generic `execute_kw` primitive every aggregate is built on.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn authenticate(&self) -> Result<SessionId, ErpError>;

    async fn call(
        &self,
        model: &str,
        method: &str,
        domain: &SearchDomain,
        options: &SearchOptions,
    ) -> Result<Vec<Value>, ErpError>;

    async fn search_read(
        &self,
        model: &str,
        domain: &SearchDomain,
        options: &SearchOptions,
    ) -> Result<Vec<Value>, ErpError> {
        self.call(model, "search_read", domain, options).await
    }
}

/// Read-only business aggregates.
#[async_trait]
pub trait ErpGateway: Send + Sync {
    async fn authenticate(&self) -> Result<SessionId, ErpError>;

    async fn sales_summary(&self, days: u32) -> Result<SalesSummary, ErpError>;

    async fn top_products(&self, limit: u32) -> Result<Vec<TopProduct>, ErpError>;

    async fn inventory(&self, product_name: Option<&str>) -> Result<InventorySnapshot, ErpError>;

    async fn customers(&self, limit: u32) -> Result<CustomerListing, ErpError>;

    async fn recent_orders(&self, limit: u32) -> Result<OrderListing, ErpError>;

    async fn dashboard(&self) -> Result<DashboardRollup, ErpError> {
        let sales = self.sales_summary(30).await?;
        let inventory = self.inventory(None).await?;
        let customers = self.customers(5).await?;
        Ok(aggregate::rollup(&sales, &inventory, &customers))
    }
}

pub struct OdooGateway<S> {
    source: S,
}

impl<S: RecordSource> OdooGateway<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[async_trait]
impl<S: RecordSource> ErpGateway for OdooGateway<S> {
    async fn authenticate(&self) -> Result<SessionId, ErpError> {
        self.source.authenticate().await
    }

    async fn sales_summary(&self, days: u32) -> Result<SalesSummary, ErpError> {
        let date_from = Duration::try_days(i64::from(days))
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or(ErpError::WindowOutOfRange(days))?
            .format("%Y-%m-%d")
            .to_string();
        let domain = SearchDomain::all()
            .and("state", "in", json!(["sale", "done"]))
            .and("date_order", ">=", date_from);
        let options =
            SearchOptions::fields(&["name", "date_order", "amount_total", "partner_id", "state"])
                .order("date_order asc");

        let rows = self.source.search_read("sale.order", &domain, &options).await?;
        let orders: Vec<RawSaleOrder> = decode_records("sale.order", rows)?;
        aggregate::summarize_sales(days, orders)
    }

    async fn top_products(&self, limit: u32) -> Result<Vec<TopProduct>, ErpError> {
        let domain = SearchDomain::all().and("state", "in", json!(["sale", "done"]));
        let options = SearchOptions::fields(&["product_id", "product_uom_qty", "price_subtotal"])
            .limit(ORDER_LINE_SCAN_LIMIT);

        let rows = self.source.search_read("sale.order.line", &domain, &options).await?;
        let lines: Vec<RawOrderLine> = decode_records("sale.order.line", rows)?;
        Ok(aggregate::rank_top_products(lines, limit as usize))
    }

    async fn inventory(&self, product_name: Option<&str>) -> Result<InventorySnapshot, ErpError> {
        let mut domain = SearchDomain::all().and("type", "=", "product");
        if let Some(name) = product_name.map(str::trim).filter(|name| !name.is_empty()) {
            domain = domain.and("name", "ilike", name);
        }
        let options = SearchOptions::fields(&["name", "qty_available", "list_price", "categ_id"])
            .limit(INVENTORY_SCAN_LIMIT);

        let rows = self.source.search_read("product.product", &domain, &options).await?;
        let products: Vec<RawProduct> = decode_records("product.product", rows)?;
        Ok(aggregate::snapshot_inventory(products))
    }

    async fn customers(&self, limit: u32) -> Result<CustomerListing, ErpError> {
        let domain = SearchDomain::all().and("customer_rank", ">", 0);
        let options = SearchOptions::fields(&["name", "email", "phone", "city", "country_id"])
            .limit(limit);

        let rows = self.source.search_read("res.partner", &domain, &options).await?;
        let partners: Vec<RawPartner> = decode_records("res.partner", rows)?;
        Ok(aggregate::list_customers(partners))
    }

    async fn recent_orders(&self, limit: u32) -> Result<OrderListing, ErpError> {
        let options =
            SearchOptions::fields(&["name", "date_order", "partner_id", "amount_total", "state"])
                .limit(limit)
                .order("date_order desc");

        let rows = self.source.search_read("sale.order", &SearchDomain::all(), &options).await?;
        let orders: Vec<RawSaleOrder> = decode_records("sale.order", rows)?;
        Ok(aggregate::list_orders(orders))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::{ErpGateway, OdooGateway, RecordSource};
    use crate::error::ErpError;
    use crate::query::{SearchDomain, SearchOptions};
    use crate::session::SessionId;

    #[derive(Default)]
    struct ScriptedSource {
        calls: Mutex<Vec<(String, Value, Value)>>,
    }

    impl ScriptedSource {
        fn recorded(&self) -> Vec<(String, Value, Value)> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl RecordSource for ScriptedSource {
        async fn authenticate(&self) -> Result<SessionId, ErpError> {
            Ok(SessionId(2))
        }

        async fn call(
            &self,
            model: &str,
            method: &str,
            domain: &SearchDomain,
            options: &SearchOptions,
        ) -> Result<Vec<Value>, ErpError> {
            assert_eq!(method, "search_read");
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((model.to_string(), domain.to_value(), options.to_kwargs()));
            }

            let rows = match model {
                "sale.order" => vec![
                    json!({"id": 1, "name": "S00001", "date_order": "2026-10-01 10:00:00",
                           "partner_id": [3, "Comercial Andes"], "amount_total": 1200.0, "state": "sale"}),
                    json!({"id": 2, "name": "S00002", "date_order": "2026-10-02 12:00:00",
                           "partner_id": false, "amount_total": 300.5, "state": "done"}),
                ],
                "product.product" => vec![
                    json!({"id": 10, "name": "Taladro", "qty_available": 4.0, "list_price": 50.0,
                           "categ_id": [1, "Herramientas"]}),
                    json!({"id": 11, "name": "Broca", "qty_available": 120.0, "list_price": 2.5,
                           "categ_id": false}),
                ],
                "res.partner" => vec![json!({"id": 3, "name": "Comercial Andes", "email": false,
                                             "phone": false, "city": "Lima", "country_id": false})],
                "sale.order.line" => vec![
                    json!({"product_id": [10, "Taladro"], "product_uom_qty": 2, "price_subtotal": 100.0}),
                    json!({"product_id": [11, "Broca"], "product_uom_qty": 30, "price_subtotal": 75.0}),
                ],
                other => return Err(ErpError::Remote { name: None, message: format!("no model {other}") }),
            };
            Ok(rows)
        }
    }

    #[tokio::test]
    async fn sales_summary_queries_confirmed_orders_in_window() {
        let gateway = OdooGateway::new(ScriptedSource::default());

        let summary = gateway.sales_summary(30).await.expect("summary should aggregate");

        assert_eq!(summary.total, 1500.5);
        assert_eq!(summary.order_count, 2);
        let calls = gateway.source().recorded();
        let (model, domain, kwargs) = &calls[0];
        assert_eq!(model, "sale.order");
        assert_eq!(domain[0], json!(["state", "in", ["sale", "done"]]));
        assert_eq!(domain[1][0], json!("date_order"));
        assert_eq!(domain[1][1], json!(">="));
        assert_eq!(kwargs["order"], json!("date_order asc"));
        assert!(kwargs.get("limit").is_none());
    }

    #[tokio::test]
    async fn oversized_sales_window_fails_without_querying() {
        let gateway = OdooGateway::new(ScriptedSource::default());

        let result = gateway.sales_summary(u32::MAX).await;

        assert_eq!(result, Err(ErpError::WindowOutOfRange(u32::MAX)));
        assert!(gateway.source().recorded().is_empty());
    }

    #[tokio::test]
    async fn inventory_filters_by_name_only_when_given() {
        let gateway = OdooGateway::new(ScriptedSource::default());

        gateway.inventory(None).await.expect("inventory");
        gateway.inventory(Some("tala")).await.expect("inventory");

        let calls = gateway.source().recorded();
        assert_eq!(calls[0].1, json!([["type", "=", "product"]]));
        assert_eq!(calls[1].1, json!([["type", "=", "product"], ["name", "ilike", "tala"]]));
        assert_eq!(calls[1].2["limit"], json!(50));
    }

    #[tokio::test]
    async fn dashboard_composes_three_aggregates() {
        let gateway = OdooGateway::new(ScriptedSource::default());

        let dashboard = gateway.dashboard().await.expect("dashboard");

        assert_eq!(dashboard.sales_total, 1500.5);
        assert_eq!(dashboard.order_count, 2);
        assert_eq!(dashboard.inventory_product_count, 2);
        assert_eq!(dashboard.inventory_value, 500.0);
        assert_eq!(dashboard.low_stock_count, 1);
        assert_eq!(dashboard.customer_count, 1);

        let models: Vec<String> =
            gateway.source().recorded().into_iter().map(|(model, _, _)| model).collect();
        assert_eq!(models, vec!["sale.order", "product.product", "res.partner"]);
        assert_eq!(gateway.source().recorded()[2].2["limit"], json!(5));
    }

    #[tokio::test]
    async fn recent_orders_are_newest_first_with_labels() {
        let gateway = OdooGateway::new(ScriptedSource::default());

        let listing = gateway.recent_orders(10).await.expect("orders");

        let calls = gateway.source().recorded();
        assert_eq!(calls[0].1, json!([]));
        assert_eq!(calls[0].2["order"], json!("date_order desc"));
        assert_eq!(listing.orders[0].state.label(), "Confirmado");
        assert_eq!(listing.orders[1].customer, None);
    }

    #[tokio::test]
    async fn top_products_scan_a_bounded_number_of_lines() {
        let gateway = OdooGateway::new(ScriptedSource::default());

        let ranked = gateway.top_products(10).await.expect("top products");

        assert_eq!(ranked[0].name, "Broca");
        assert_eq!(gateway.source().recorded()[0].2["limit"], json!(1000));
    }
}
