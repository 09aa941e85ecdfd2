use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    Sales,
    TopProducts,
    Inventory,
    Customers,
    RecentOrders,
    Dashboard,
}

impl QueryIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::TopProducts => "top_products",
            Self::Inventory => "inventory",
            Self::Customers => "customers",
            Self::RecentOrders => "recent_orders",
            Self::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct IntentRule {
    pub intent: QueryIntent,
    pub keywords: &'static [&'static str],
}

/// Evaluated top to bottom; the first rule with a matching keyword wins.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule { intent: QueryIntent::Sales, keywords: &["venta", "ventas", "vendido", "ingreso"] },
    IntentRule {
        intent: QueryIntent::TopProducts,
        keywords: &["producto", "top", "más vendido", "popular"],
    },
    IntentRule { intent: QueryIntent::Inventory, keywords: &["inventario", "stock", "existencia"] },
    IntentRule { intent: QueryIntent::Customers, keywords: &["cliente", "clientes"] },
    IntentRule { intent: QueryIntent::RecentOrders, keywords: &["orden", "pedido", "reciente"] },
];

#[derive(Clone, Debug)]
pub struct IntentClassifier {
    rules: &'static [IntentRule],
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self { rules: INTENT_RULES }
    }
}

impl IntentClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classify(&self, utterance: &str) -> QueryIntent {
        let normalized = normalize_text(utterance);
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|keyword| normalized.contains(keyword)))
            .map(|rule| rule.intent)
            .unwrap_or(QueryIntent::Dashboard)
    }
}

pub(crate) fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{IntentClassifier, QueryIntent, INTENT_RULES};

    #[test]
    fn classifies_each_domain() {
        let classifier = IntentClassifier::new();
        let cases = [
            ("¿Cómo van las ventas?", QueryIntent::Sales),
            ("¿Cuáles son los productos más populares?", QueryIntent::TopProducts),
            ("Muéstrame el inventario", QueryIntent::Inventory),
            ("¿Quiénes son mis clientes?", QueryIntent::Customers),
            ("Ver pedidos recientes", QueryIntent::RecentOrders),
            ("Hola, ¿qué tal?", QueryIntent::Dashboard),
        ];

        for (utterance, expected) in cases {
            assert_eq!(classifier.classify(utterance), expected, "utterance: {utterance}");
        }
    }

    #[test]
    fn earlier_rules_win_over_later_ones() {
        let classifier = IntentClassifier::new();

        assert_eq!(classifier.classify("ventas por cliente"), QueryIntent::Sales);
        assert_eq!(classifier.classify("stock del producto estrella"), QueryIntent::TopProducts);
        assert_eq!(classifier.classify("órdenes de mis clientes"), QueryIntent::Customers);
    }

    #[test]
    fn matching_is_case_insensitive_including_accents() {
        let classifier = IntentClassifier::new();

        assert_eq!(classifier.classify("LO MÁS VENDIDO"), QueryIntent::Sales);
        assert_eq!(classifier.classify("EXISTENCIAS"), QueryIntent::Inventory);
    }

    #[test]
    fn every_rule_keyword_is_reachable() {
        let classifier = IntentClassifier::new();
        for (position, rule) in INTENT_RULES.iter().enumerate() {
            for keyword in rule.keywords {
                let shadowed = INTENT_RULES[..position]
                    .iter()
                    .any(|earlier| earlier.keywords.iter().any(|k| keyword.contains(k)));
                if !shadowed {
                    assert_eq!(classifier.classify(keyword), rule.intent, "keyword: {keyword}");
                }
            }
        }
    }
}
