use std::sync::Arc;
use std::time::{Duration, Instant};

use aria_core::config::AppConfig;
use aria_core::domain::visualization::Visualization;
use aria_erp::ErpGateway;
use chrono::Utc;
use tracing::{info, warn};

use crate::context::build_context;
use crate::fetch::{DataFetcher, FetchLimits};
use crate::intent::{IntentClassifier, QueryIntent};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompt::SystemPrompt;
use crate::shaper::shape;
use crate::suggestions::suggest;

#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeSettings {
    pub limits: FetchLimits,
    pub erp_timeout: Duration,
    pub llm_timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            limits: FetchLimits::default(),
            erp_timeout: Duration::from_secs(30),
            llm_timeout: Duration::from_secs(60),
            temperature: 0.3,
            max_tokens: 4096,
        }
    }
}

impl RuntimeSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            limits: FetchLimits::default(),
            erp_timeout: Duration::from_secs(config.erp.timeout_secs),
            llm_timeout: Duration::from_secs(config.llm.timeout_secs),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }
}

/// Everything the pipeline produced for one message, before persistence.
#[derive(Clone, Debug, PartialEq)]
pub struct AssistantTurn {
    pub intent: QueryIntent,
    pub context: String,
    pub message: String,
    pub visualization: Option<Visualization>,
    pub suggestions: Vec<String>,
}

pub struct AgentRuntime {
    classifier: IntentClassifier,
    fetcher: DataFetcher,
    llm: Arc<dyn LlmClient>,
    prompt: SystemPrompt,
    settings: RuntimeSettings,
}

impl AgentRuntime {
    pub fn new(
        gateway: Arc<dyn ErpGateway>,
        llm: Arc<dyn LlmClient>,
        settings: RuntimeSettings,
    ) -> tera::Result<Self> {
        Ok(Self {
            classifier: IntentClassifier::new(),
            fetcher: DataFetcher::new(gateway, settings.limits, settings.erp_timeout),
            llm,
            prompt: SystemPrompt::new()?,
            settings,
        })
    }

    /// Runs classify, fetch, context, generate, shape and suggest in sequence.
    /// ERP and generation failures are folded into the returned turn.
    pub async fn process_message(&self, text: &str) -> AssistantTurn {
        let started = Instant::now();
        let intent = self.classifier.classify(text);
        info!(event_name = "agent.pipeline.classified", intent = %intent, "classified message");

        let fetched = self.fetcher.fetch(intent).await;
        let context = build_context(&fetched.outcome);
        let message = self.generate(text, &context).await;
        let visualization = shape(&fetched);
        let suggestions = suggest(text);

        info!(
            event_name = "agent.pipeline.completed",
            intent = %intent,
            data_ok = fetched.outcome.is_ok(),
            has_visualization = visualization.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline completed"
        );

        AssistantTurn { intent, context, message, visualization, suggestions }
    }

    async fn generate(&self, text: &str, context: &str) -> String {
        let system = match self.prompt.render(context, Utc::now().date_naive()) {
            Ok(system) => system,
            Err(error) => return generation_failure(&error),
        };
        let request = CompletionRequest {
            system,
            user: text.to_string(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        match tokio::time::timeout(self.settings.llm_timeout, self.llm.complete(&request)).await {
            Ok(Ok(generated)) => generated,
            Ok(Err(error)) => generation_failure(&error),
            Err(_) => generation_failure(&format!(
                "text generation timed out after {}s",
                self.settings.llm_timeout.as_secs()
            )),
        }
    }
}

fn generation_failure(error: &dyn std::fmt::Display) -> String {
    warn!(event_name = "agent.pipeline.generation_failed", error = %error, "text generation failed");
    format!("Error al generar respuesta: {error}")
}
