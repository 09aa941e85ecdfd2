//! Read-only passthrough of the ERP gateway aggregates.
//!
//! - `GET /api/v1/odoo/summary`
//! - `GET /api/v1/odoo/sales?days=30`
//! - `GET /api/v1/odoo/inventory?product_name=`
//! - `GET /api/v1/odoo/customers?limit=20`
//! - `GET /api/v1/odoo/orders?limit=10`
//! - `GET /api/v1/odoo/products?limit=10`
//!
//! Gateway failures surface as 503 responses. Each request is bounded by the
//! ERP timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use aria_core::domain::customer::CustomerListing;
use aria_core::domain::dashboard::DashboardRollup;
use aria_core::domain::inventory::InventorySnapshot;
use aria_core::domain::order::OrderListing;
use aria_core::domain::product::TopProduct;
use aria_core::domain::sales::SalesSummary;
use aria_core::errors::ApplicationError;
use aria_erp::{ErpError, ErpGateway};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::error::ApiError;

#[derive(Clone)]
pub struct ErpState {
    gateway: Arc<dyn ErpGateway>,
    timeout: Duration,
}

impl ErpState {
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, ErpError>>,
    ) -> Result<Json<T>, ApiError> {
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ErpError::Timeout(self.timeout)),
        };
        outcome.map(Json).map_err(|error| upstream(operation, error))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub product_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

impl LimitQuery {
    fn or(&self, default: u32) -> u32 {
        self.limit.unwrap_or(default)
    }
}

pub fn router(gateway: Arc<dyn ErpGateway>, timeout: Duration) -> Router {
    Router::new()
        .route("/api/v1/odoo/summary", get(summary))
        .route("/api/v1/odoo/sales", get(sales))
        .route("/api/v1/odoo/inventory", get(inventory))
        .route("/api/v1/odoo/customers", get(customers))
        .route("/api/v1/odoo/orders", get(orders))
        .route("/api/v1/odoo/products", get(products))
        .with_state(ErpState { gateway, timeout })
}

async fn summary(State(state): State<ErpState>) -> Result<Json<DashboardRollup>, ApiError> {
    state.bounded("summary", state.gateway.dashboard()).await
}

async fn sales(
    State(state): State<ErpState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<SalesSummary>, ApiError> {
    let days = query.days.unwrap_or(30);
    state.bounded("sales", state.gateway.sales_summary(days)).await
}

async fn inventory(
    State(state): State<ErpState>,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<InventorySnapshot>, ApiError> {
    state.bounded("inventory", state.gateway.inventory(query.product_name.as_deref())).await
}

async fn customers(
    State(state): State<ErpState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<CustomerListing>, ApiError> {
    state.bounded("customers", state.gateway.customers(query.or(20))).await
}

async fn orders(
    State(state): State<ErpState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<OrderListing>, ApiError> {
    state.bounded("orders", state.gateway.recent_orders(query.or(10))).await
}

async fn products(
    State(state): State<ErpState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TopProduct>>, ApiError> {
    state.bounded("products", state.gateway.top_products(query.or(10))).await
}

fn upstream(operation: &'static str, error: ErpError) -> ApiError {
    let api_error = ApiError::from(ApplicationError::from(error));
    warn!(
        event_name = "erp.passthrough.failed",
        operation,
        correlation_id = api_error.0.correlation_id(),
        error = api_error.0.message(),
        "ERP passthrough request failed"
    );
    api_error
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use aria_core::domain::customer::{Customer, CustomerId, CustomerListing};
    use aria_core::domain::inventory::InventorySnapshot;
    use aria_core::domain::order::OrderListing;
    use aria_core::domain::product::{ProductId, TopProduct};
    use aria_core::domain::sales::SalesSummary;
    use aria_erp::{ErpError, ErpGateway, SessionId};
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::router;

    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<String>>,
        offline: bool,
        stalled: bool,
    }

    impl RecordingGateway {
        async fn stall(&self) {
            if self.stalled {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }

        fn record(&self, call: String) -> Result<(), ErpError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
            if self.offline {
                Err(ErpError::Transport("connection refused".to_string()))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl ErpGateway for RecordingGateway {
        async fn authenticate(&self) -> Result<SessionId, ErpError> {
            self.record("authenticate".to_string()).map(|()| SessionId(2))
        }

        async fn sales_summary(&self, days: u32) -> Result<SalesSummary, ErpError> {
            self.record(format!("sales:{days}"))?;
            if days > 36_500 {
                return Err(ErpError::WindowOutOfRange(days));
            }
            Ok(SalesSummary { window_days: days, total: 900.0, order_count: 3, ..Default::default() })
        }

        async fn top_products(&self, limit: u32) -> Result<Vec<TopProduct>, ErpError> {
            self.record(format!("products:{limit}"))?;
            self.stall().await;
            Ok(vec![TopProduct {
                product_id: ProductId(7),
                name: "Silla ergonómica".to_string(),
                quantity: 12.0,
                revenue: 1440.0,
            }])
        }

        async fn inventory(&self, product_name: Option<&str>) -> Result<InventorySnapshot, ErpError> {
            self.record(format!("inventory:{}", product_name.unwrap_or("*")))?;
            Ok(InventorySnapshot::default())
        }

        async fn customers(&self, limit: u32) -> Result<CustomerListing, ErpError> {
            self.record(format!("customers:{limit}"))?;
            Ok(CustomerListing::new(vec![Customer {
                id: CustomerId(3),
                name: "Comercial Andes".to_string(),
                email: None,
                phone: None,
                city: Some("Lima".to_string()),
                country: None,
            }]))
        }

        async fn recent_orders(&self, limit: u32) -> Result<OrderListing, ErpError> {
            self.record(format!("orders:{limit}"))?;
            Ok(OrderListing::default())
        }
    }

    async fn get(gateway: Arc<RecordingGateway>, uri: &str) -> (StatusCode, Value) {
        let response = router(gateway, Duration::from_millis(50))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn query_defaults_follow_each_endpoint() {
        let gateway = Arc::new(RecordingGateway::default());

        for uri in [
            "/api/v1/odoo/sales",
            "/api/v1/odoo/customers",
            "/api/v1/odoo/orders",
            "/api/v1/odoo/products",
            "/api/v1/odoo/inventory",
        ] {
            let (status, _) = get(gateway.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
        }

        assert_eq!(
            gateway.calls(),
            vec!["sales:30", "customers:20", "orders:10", "products:10", "inventory:*"]
        );
    }

    #[tokio::test]
    async fn query_parameters_are_forwarded() {
        let gateway = Arc::new(RecordingGateway::default());

        let (_, sales) = get(gateway.clone(), "/api/v1/odoo/sales?days=7").await;
        get(gateway.clone(), "/api/v1/odoo/inventory?product_name=silla").await;
        let (_, customers) = get(gateway.clone(), "/api/v1/odoo/customers?limit=5").await;

        assert_eq!(sales["window_days"], 7);
        assert_eq!(sales["total"], 900.0);
        assert_eq!(customers["total"], 1);
        assert_eq!(customers["customers"][0]["name"], "Comercial Andes");
        assert_eq!(gateway.calls(), vec!["sales:7", "inventory:silla", "customers:5"]);
    }

    #[tokio::test]
    async fn gateway_failures_become_service_unavailable() {
        let gateway = Arc::new(RecordingGateway { offline: true, ..Default::default() });

        let (status, body) = get(gateway, "/api/v1/odoo/products?limit=3").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "ERP transport failure: connection refused");
        assert!(body["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn summary_composes_the_dashboard() {
        let gateway = Arc::new(RecordingGateway::default());

        let (status, body) = get(gateway.clone(), "/api/v1/odoo/summary").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sales_total"], 900.0);
        assert_eq!(body["customer_count"], 1);
        assert_eq!(gateway.calls(), vec!["sales:30", "inventory:*", "customers:5"]);
    }

    #[tokio::test]
    async fn oversized_sales_window_is_a_bad_request() {
        let gateway = Arc::new(RecordingGateway::default());

        let (status, body) = get(gateway, "/api/v1/odoo/sales?days=4294967295").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "a 4294967295-day sales window is out of range");
    }

    #[tokio::test]
    async fn slow_gateway_calls_are_cut_off() {
        let gateway = Arc::new(RecordingGateway { stalled: true, ..Default::default() });

        let (status, body) = get(gateway, "/api/v1/odoo/products").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["detail"].as_str().is_some_and(|detail| detail.starts_with("ERP request timed out")));
        assert!(body["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }
}
