use std::sync::Arc;

use aria_agent::{AgentRuntime, ChatCompletionsClient, RuntimeSettings};
use aria_core::config::{AppConfig, ConfigError, LoadOptions};
use aria_db::{
    connect_with_config, migrations, ConversationRepository, DbPool, SqlConversationRepository,
};
use aria_erp::{ErpError, ErpGateway, OdooClient, OdooGateway};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub gateway: Arc<dyn ErpGateway>,
    pub agent_runtime: Arc<AgentRuntime>,
    pub conversations: Arc<dyn ConversationRepository>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("ERP client setup failed: {0}")]
    Erp(#[source] ErpError),
    #[error("text generation client setup failed: {0}")]
    LlmClient(String),
    #[error("system prompt template is invalid: {0}")]
    Prompt(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_config(&config.database)
        .await
        .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let odoo = OdooClient::from_config(&config.erp).map_err(BootstrapError::Erp)?;
    let gateway: Arc<dyn ErpGateway> = Arc::new(OdooGateway::new(odoo));

    let llm = ChatCompletionsClient::from_config(&config.llm)
        .map_err(|error| BootstrapError::LlmClient(error.to_string()))?;
    info!(
        event_name = "system.bootstrap.llm_configured",
        provider = config.llm.provider.as_str(),
        model = llm.model(),
        base_url = config.llm.effective_base_url(),
        "text generation client configured"
    );

    let agent_runtime = AgentRuntime::new(
        gateway.clone(),
        Arc::new(llm),
        RuntimeSettings::from_config(&config),
    )
    .map_err(|error| BootstrapError::Prompt(error.to_string()))?;

    let conversations: Arc<dyn ConversationRepository> =
        Arc::new(SqlConversationRepository::new(db_pool.clone()));

    Ok(Application {
        config,
        db_pool,
        gateway,
        agent_runtime: Arc::new(agent_runtime),
        conversations,
    })
}

#[cfg(test)]
mod tests {
    use aria_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::bootstrap;

    fn overrides(database_url: &str) -> ConfigOverrides {
        ConfigOverrides {
            database_url: Some(database_url.to_string()),
            erp_url: Some("http://127.0.0.1:8069".to_string()),
            erp_password: Some("admin-password".to_string()),
            llm_api_key: Some("gsk-test".to_string()),
            ..ConfigOverrides::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_erp_url() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                erp_url: Some(String::new()),
                ..overrides("sqlite::memory:")
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("erp.url"), "{message}");
    }

    #[tokio::test]
    async fn bootstrap_migrates_and_wires_services() {
        let app = bootstrap(LoadOptions { overrides: overrides("sqlite::memory:"), ..LoadOptions::default() })
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('conversation', 'message')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("chat tables should exist after bootstrap");
        assert_eq!(table_count, 2);

        let conversation = app
            .conversations
            .create_conversation("Ventas de octubre", None)
            .await
            .expect("repository should use the migrated pool");
        assert_eq!(conversation.title, "Ventas de octubre");

        app.db_pool.close().await;
    }
}
