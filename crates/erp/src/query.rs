use serde_json::{json, Map, Value};

/// One `[field, operator, value]` triple of an Odoo search domain.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), operator: operator.into(), value: value.into() }
    }
}

/// Conjunction of conditions; an empty domain matches every record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchDomain(Vec<Condition>);

impl SearchDomain {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.0.push(Condition::new(field, operator, value));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|condition| {
                    json!([condition.field, condition.operator, condition.value])
                })
                .collect(),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchOptions {
    pub fields: Vec<String>,
    pub limit: Option<u32>,
    pub order: Option<String>,
}

impl SearchOptions {
    pub fn fields(fields: &[&str]) -> Self {
        Self { fields: fields.iter().map(|field| (*field).to_string()).collect(), ..Self::default() }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, order: &str) -> Self {
        self.order = Some(order.to_string());
        self
    }

    /// Keyword arguments for `execute_kw`. Unset options are omitted, and a
    /// zero limit means "no limit".
    pub fn to_kwargs(&self) -> Value {
        let mut kwargs = Map::new();
        if !self.fields.is_empty() {
            kwargs.insert("fields".to_string(), json!(self.fields));
        }
        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            kwargs.insert("limit".to_string(), json!(limit));
        }
        if let Some(order) = self.order.as_deref().filter(|order| !order.is_empty()) {
            kwargs.insert("order".to_string(), json!(order));
        }
        Value::Object(kwargs)
    }
}
