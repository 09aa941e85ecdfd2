//! Read-only access to the Odoo ERP.
//!
//! [`OdooClient`] speaks JSON-RPC and keeps the authenticated session;
//! [`OdooGateway`] turns raw records into the aggregates in `aria_core::domain`.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod gateway;
pub mod query;
pub mod records;
pub mod rpc;
pub mod session;

pub use client::OdooClient;
pub use error::ErpError;
pub use gateway::{ErpGateway, OdooGateway, RecordSource};
pub use query::{Condition, SearchDomain, SearchOptions};
pub use session::{SessionCache, SessionId};
