pub mod config;
pub mod domain;
pub mod errors;
pub mod money;

pub use domain::chat::{
    ChatReply, ChatRole, ChatTurn, Conversation, ConversationId, MessageMetadata,
};
pub use domain::customer::{Customer, CustomerId, CustomerListing};
pub use domain::dashboard::DashboardRollup;
pub use domain::inventory::{InventorySnapshot, StockItem, LOW_STOCK_THRESHOLD};
pub use domain::order::{OrderListing, OrderState, OrderSummary};
pub use domain::product::{ProductId, TopProduct};
pub use domain::sales::{DailySales, SalesSummary};
pub use domain::visualization::{
    Chart, ChartKind, ChartPoint, Table, Visualization, VisualizationKind,
};
pub use errors::{ApplicationError, InterfaceError};
pub use money::{format_currency, round_money};
