pub mod chat;
pub mod customer;
pub mod dashboard;
pub mod inventory;
pub mod order;
pub mod product;
pub mod sales;
pub mod visualization;
