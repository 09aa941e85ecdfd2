//! Typed views over `search_read` rows.
//!
//! Odoo reports unset fields as `false` and many-to-one fields as
//! `[id, "display name"]` pairs; the deserializers here absorb both.

use aria_core::domain::customer::{Customer, CustomerId};
use aria_core::domain::inventory::StockItem;
use aria_core::domain::order::{OrderState, OrderSummary};
use aria_core::domain::product::ProductId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ErpError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Many2One {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawSaleOrder {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub date_order: Option<String>,
    #[serde(default, deserialize_with = "many2one")]
    pub partner_id: Option<Many2One>,
    #[serde(default, deserialize_with = "number")]
    pub amount_total: f64,
    #[serde(default, deserialize_with = "text")]
    pub state: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawOrderLine {
    #[serde(default, deserialize_with = "many2one")]
    pub product_id: Option<Many2One>,
    #[serde(default, deserialize_with = "number")]
    pub product_uom_qty: f64,
    #[serde(default, deserialize_with = "number")]
    pub price_subtotal: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawProduct {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "number")]
    pub qty_available: f64,
    #[serde(default, deserialize_with = "number")]
    pub list_price: f64,
    #[serde(default, deserialize_with = "many2one")]
    pub categ_id: Option<Many2One>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawPartner {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "many2one")]
    pub country_id: Option<Many2One>,
}

pub fn decode_records<T: DeserializeOwned>(model: &str, rows: Vec<Value>) -> Result<Vec<T>, ErpError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|error| ErpError::Decode(format!("{model} record: {error}")))
        })
        .collect()
}

impl From<RawSaleOrder> for OrderSummary {
    fn from(raw: RawSaleOrder) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            date_order: raw.date_order,
            customer: raw.partner_id.map(|partner| partner.name),
            amount_total: raw.amount_total,
            state: OrderState::from(raw.state),
        }
    }
}

impl From<RawProduct> for StockItem {
    fn from(raw: RawProduct) -> Self {
        Self {
            product_id: ProductId(raw.id),
            name: raw.name,
            quantity: raw.qty_available,
            unit_price: raw.list_price,
            category: raw.categ_id.map(|category| category.name),
        }
    }
}

impl From<RawPartner> for Customer {
    fn from(raw: RawPartner) -> Self {
        Self {
            id: CustomerId(raw.id),
            name: raw.name,
            email: raw.email,
            phone: raw.phone,
            city: raw.city,
            country: raw.country_id.map(|country| country.name),
        }
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(value) if !value.trim().is_empty() => Ok(Some(value)),
        Value::String(_) | Value::Null | Value::Bool(false) => Ok(None),
        other => Err(serde::de::Error::custom(format!("expected text or false, got {other}"))),
    }
}

fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(value) => value
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("number is out of range")),
        Value::Null | Value::Bool(false) => Ok(0.0),
        other => Err(serde::de::Error::custom(format!("expected number or false, got {other}"))),
    }
}

fn many2one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Many2One>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(pair) => match pair.as_slice() {
            [Value::Number(id), Value::String(name)] => id
                .as_i64()
                .map(|id| Some(Many2One { id, name: name.clone() }))
                .ok_or_else(|| serde::de::Error::custom("many2one id is not an integer")),
            _ => Err(serde::de::Error::custom("expected [id, name] pair")),
        },
        Value::Null | Value::Bool(false) => Ok(None),
        other => Err(serde::de::Error::custom(format!("expected [id, name] or false, got {other}"))),
    }
}
