use aria_core::domain::chat::{ChatReply, ConversationId};
use aria_core::domain::visualization::Visualization;
use chrono::Utc;

use crate::runtime::AssistantTurn;

/// Final envelope for a turn, timestamped now.
pub fn assemble_reply(turn: AssistantTurn, conversation_id: ConversationId) -> ChatReply {
    let (chart, table) = Visualization::into_parts(turn.visualization);
    ChatReply {
        message: turn.message,
        conversation_id,
        chart,
        table,
        suggestions: turn.suggestions,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use aria_core::domain::chat::ConversationId;
    use aria_core::domain::visualization::{Table, Visualization};
    use chrono::Utc;

    use super::assemble_reply;
    use crate::intent::QueryIntent;
    use crate::runtime::AssistantTurn;

    #[test]
    fn table_turn_fills_only_table() {
        let before = Utc::now();
        let turn = AssistantTurn {
            intent: QueryIntent::Customers,
            context: "CLIENTES: 0 activos".to_string(),
            message: "No hay clientes.".to_string(),
            visualization: Some(Visualization::Table(Table {
                headers: vec!["Nombre".to_string()],
                rows: Vec::new(),
                title: None,
            })),
            suggestions: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };

        let reply = assemble_reply(turn, ConversationId("c-1".to_string()));

        assert!(reply.chart.is_none());
        assert!(reply.table.is_some());
        assert_eq!(reply.conversation_id.as_str(), "c-1");
        assert!(reply.timestamp >= before);
        assert!(reply.metadata().has_table);
    }
}
