use std::fmt;

use serde::{Deserialize, Serialize};

/// Sale order state as reported by the ERP. Unknown raw states are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderState {
    Draft,
    Sent,
    Sale,
    Done,
    Cancel,
    Other(String),
}

impl OrderState {
    pub fn as_raw(&self) -> &str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Sale => "sale",
            Self::Done => "done",
            Self::Cancel => "cancel",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable label shown in order tables.
    pub fn label(&self) -> &str {
        match self {
            Self::Draft => "Borrador",
            Self::Sent => "Enviado",
            Self::Sale => "Confirmado",
            Self::Done => "Completado",
            Self::Cancel => "Cancelado",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "draft" => Self::Draft,
            "sent" => Self::Sent,
            "sale" => Self::Sale,
            "done" => Self::Done,
            "cancel" => Self::Cancel,
            _ => Self::Other(value),
        }
    }
}

impl From<OrderState> for String {
    fn from(value: OrderState) -> Self {
        value.as_raw().to_string()
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,
    pub name: String,
    /// Raw ERP timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub date_order: Option<String>,
    pub customer: Option<String>,
    pub amount_total: f64,
    pub state: OrderState,
}

impl OrderSummary {
    pub fn date(&self) -> Option<&str> {
        self.date_order.as_deref().map(|raw| raw.get(..10).unwrap_or(raw))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderListing {
    pub orders: Vec<OrderSummary>,
}
