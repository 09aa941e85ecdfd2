use crate::intent::normalize_text;

pub const SALES_FOLLOW_UPS: [&str; 3] = [
    "¿Cuáles son los productos más vendidos?",
    "Muéstrame el inventario",
    "¿Quiénes son mis clientes?",
];

pub const CATALOG_FOLLOW_UPS: [&str; 3] =
    ["¿Cómo van las ventas?", "Ver órdenes recientes", "Mostrar clientes"];

pub const DEFAULT_FOLLOW_UPS: [&str; 3] = [
    "¿Cómo van las ventas?",
    "Muéstrame el inventario",
    "¿Cuáles son los productos más vendidos?",
];

/// Three follow-up questions chosen from the utterance alone.
///
/// Coarser than intent classification: only `venta` and
/// `producto`/`inventario` are distinguished.
pub fn suggest(utterance: &str) -> Vec<String> {
    let normalized = normalize_text(utterance);
    let follow_ups = if normalized.contains("venta") {
        SALES_FOLLOW_UPS
    } else if normalized.contains("producto") || normalized.contains("inventario") {
        CATALOG_FOLLOW_UPS
    } else {
        DEFAULT_FOLLOW_UPS
    };
    follow_ups.iter().map(|suggestion| (*suggestion).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::{suggest, CATALOG_FOLLOW_UPS, DEFAULT_FOLLOW_UPS, SALES_FOLLOW_UPS};

    #[test]
    fn buckets_follow_the_utterance() {
        assert_eq!(suggest("¿Cómo van las VENTAS?"), SALES_FOLLOW_UPS);
        assert_eq!(suggest("stock por producto"), CATALOG_FOLLOW_UPS);
        assert_eq!(suggest("revisa el inventario"), CATALOG_FOLLOW_UPS);
        assert_eq!(suggest("¿quiénes son mis clientes?"), DEFAULT_FOLLOW_UPS);
    }

    #[test]
    fn always_three_and_deterministic() {
        for utterance in ["", "ventas", "producto", "hola"] {
            let first = suggest(utterance);
            assert_eq!(first.len(), 3);
            assert_eq!(first, suggest(utterance));
        }
    }
}
