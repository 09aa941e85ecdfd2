use std::sync::Arc;
use std::time::Duration;

use aria_core::domain::customer::CustomerListing;
use aria_core::domain::dashboard::DashboardRollup;
use aria_core::domain::inventory::InventorySnapshot;
use aria_core::domain::order::OrderListing;
use aria_core::domain::product::TopProduct;
use aria_core::domain::sales::SalesSummary;
use aria_core::domain::visualization::VisualizationKind;
use aria_erp::{ErpError, ErpGateway};
use tracing::{error, warn};

use crate::intent::QueryIntent;

#[derive(Clone, Debug, PartialEq)]
pub enum FetchedData {
    Sales(SalesSummary),
    TopProducts(Vec<TopProduct>),
    Inventory(InventorySnapshot),
    Customers(CustomerListing),
    RecentOrders(OrderListing),
    Dashboard(DashboardRollup),
}

pub type FetchOutcome = Result<FetchedData, ErpError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchLimits {
    pub sales_window_days: u32,
    pub top_products: u32,
    pub customers: u32,
    pub recent_orders: u32,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self { sales_window_days: 30, top_products: 10, customers: 20, recent_orders: 10 }
    }
}

/// Result of one fetch. `visualization` is only set when data was retrieved.
#[derive(Clone, Debug, PartialEq)]
pub struct Fetched {
    pub intent: QueryIntent,
    pub outcome: FetchOutcome,
    pub visualization: Option<VisualizationKind>,
}

pub fn visualization_for(intent: QueryIntent) -> Option<VisualizationKind> {
    match intent {
        QueryIntent::Sales => Some(VisualizationKind::LineChart),
        QueryIntent::TopProducts | QueryIntent::Inventory => Some(VisualizationKind::BarChart),
        QueryIntent::Customers | QueryIntent::RecentOrders => Some(VisualizationKind::Table),
        QueryIntent::Dashboard => None,
    }
}

pub struct DataFetcher {
    gateway: Arc<dyn ErpGateway>,
    limits: FetchLimits,
    timeout: Duration,
}

impl DataFetcher {
    pub fn new(gateway: Arc<dyn ErpGateway>, limits: FetchLimits, timeout: Duration) -> Self {
        Self { gateway, limits, timeout }
    }

    pub async fn fetch(&self, intent: QueryIntent) -> Fetched {
        let outcome = match tokio::time::timeout(self.timeout, self.fetch_unbounded(intent)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ErpError::Timeout(self.timeout)),
        };

        if let Err(failure) = &outcome {
            if failure.is_authentication() {
                error!(
                    event_name = "agent.fetch.authentication_failed",
                    intent = %intent,
                    error = %failure,
                    "ERP authentication failed while fetching data"
                );
            } else {
                warn!(
                    event_name = "agent.fetch.failed",
                    intent = %intent,
                    error = %failure,
                    "ERP fetch failed; continuing without data"
                );
            }
        }

        let visualization = if outcome.is_ok() { visualization_for(intent) } else { None };
        Fetched { intent, outcome, visualization }
    }

    async fn fetch_unbounded(&self, intent: QueryIntent) -> FetchOutcome {
        let gateway = self.gateway.as_ref();
        let limits = self.limits;
        match intent {
            QueryIntent::Sales => {
                gateway.sales_summary(limits.sales_window_days).await.map(FetchedData::Sales)
            }
            QueryIntent::TopProducts => {
                gateway.top_products(limits.top_products).await.map(FetchedData::TopProducts)
            }
            QueryIntent::Inventory => gateway.inventory(None).await.map(FetchedData::Inventory),
            QueryIntent::Customers => {
                gateway.customers(limits.customers).await.map(FetchedData::Customers)
            }
            QueryIntent::RecentOrders => {
                gateway.recent_orders(limits.recent_orders).await.map(FetchedData::RecentOrders)
            }
            QueryIntent::Dashboard => gateway.dashboard().await.map(FetchedData::Dashboard),
        }
    }
}
