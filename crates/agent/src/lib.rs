//! Question-answering pipeline over ERP data.
//!
//! A message flows through:
//! 1. **Intent classification** (`intent`) - keyword rules pick the business domain
//! 2. **Data fetching** (`fetch`) - one gateway aggregate per intent, failures kept as values
//! 3. **Grounding context** (`context`) - compact Spanish summary for the model
//! 4. **Text generation** (`llm`, `prompt`) - OpenAI-compatible chat completions
//! 5. **Shaping** (`shaper`, `suggestions`, `reply`) - chart or table, follow-ups, envelope
//!
//! `AgentRuntime` in `runtime` wires the stages together.

pub mod context;
pub mod fetch;
pub mod intent;
pub mod llm;
pub mod prompt;
pub mod reply;
pub mod runtime;
pub mod shaper;
pub mod suggestions;

pub use fetch::{DataFetcher, FetchLimits, FetchOutcome, Fetched, FetchedData};
pub use intent::{IntentClassifier, QueryIntent};
pub use llm::{ChatCompletionsClient, CompletionRequest, LlmClient};
pub use reply::assemble_reply;
pub use runtime::{AgentRuntime, AssistantTurn, RuntimeSettings};
