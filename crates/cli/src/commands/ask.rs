use std::sync::Arc;

use aria_agent::{assemble_reply, AgentRuntime, ChatCompletionsClient, RuntimeSettings};
use aria_core::config::{AppConfig, LoadOptions};
use aria_core::domain::chat::ConversationId;
use aria_erp::{OdooClient, OdooGateway};

use crate::commands::{block_on_runtime, CommandResult};

/// Answers one question without persisting it.
pub fn run(question: &str) -> CommandResult {
    let question = question.trim();
    if question.is_empty() {
        return CommandResult::failure("ask", "invalid_input", "question must not be empty", 2);
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match agent_runtime(&config) {
        Ok(runtime) => runtime,
        Err(message) => return CommandResult::failure("ask", "client_setup", message, 3),
    };
    let executor = match block_on_runtime() {
        Ok(executor) => executor,
        Err(message) => return CommandResult::failure("ask", "runtime_init", message, 3),
    };

    let turn = executor.block_on(runtime.process_message(question));
    let intent = turn.intent;
    let reply = assemble_reply(turn, ConversationId::generate());

    match serde_json::to_value(&reply) {
        Ok(data) => CommandResult::success_with_data("ask", format!("answered as {intent}"), data),
        Err(error) => CommandResult::failure("ask", "serialization", error.to_string(), 4),
    }
}

fn agent_runtime(config: &AppConfig) -> Result<AgentRuntime, String> {
    let odoo = OdooClient::from_config(&config.erp).map_err(|error| error.to_string())?;
    let llm = ChatCompletionsClient::from_config(&config.llm).map_err(|error| error.to_string())?;
    AgentRuntime::new(
        Arc::new(OdooGateway::new(odoo)),
        Arc::new(llm),
        RuntimeSettings::from_config(config),
    )
    .map_err(|error| error.to_string())
}
