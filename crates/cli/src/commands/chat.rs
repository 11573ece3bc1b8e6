use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use maitred_agent::llm::OpenAiChatClient;
use maitred_agent::runtime::AgentRuntime;
use maitred_core::config::{AppConfig, LoadOptions};
use maitred_core::domain::conversation::ConversationId;
use maitred_db::{connect_with_settings, schema, SqlConversationStore};

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ChatOutcome {
    command: &'static str,
    status: &'static str,
    conversation_id: String,
    response: String,
}

/// One-shot turn through the same runtime the server uses. Prints the
/// reply and the conversation id so a follow-up can continue the thread.
pub fn run(
    message: &str,
    conversation_id: Option<String>,
    user_id: Option<String>,
    restaurant_id: Option<String>,
) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("chat", "config", error.to_string(), 1),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("chat", "runtime", error.to_string(), 1),
    };

    let conversation_id = conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("conv_{}", Uuid::new_v4()));
    let id = ConversationId(conversation_id.clone());

    let outcome = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("database", error.to_string()))?;

        schema::ensure_schema(&pool).await.map_err(|error| ("schema", error.to_string()))?;

        let llm = OpenAiChatClient::new(
            config.llm.api_key.clone(),
            config.llm.base_url.clone(),
            config.llm.model.clone(),
            config.llm.timeout_secs,
            config.llm.temperature,
        )
        .map_err(|error| ("llm", error.to_string()))?;

        let agent =
            AgentRuntime::new(Arc::new(llm), Arc::new(SqlConversationStore::new(pool.clone())));
        let reply = agent
            .handle_user_turn(&id, message, user_id, restaurant_id)
            .await
            .map_err(|error| ("agent", error.to_string()))?;

        pool.close().await;
        Ok::<String, (&'static str, String)>(reply)
    });

    match outcome {
        Ok(response) => {
            let payload = ChatOutcome {
                command: "chat",
                status: "ok",
                conversation_id,
                response,
            };
            let output = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|error| format!("chat serialization failed: {error}"));
            CommandResult { exit_code: 0, output }
        }
        Err((error_class, message)) => CommandResult::failure("chat", error_class, message, 1),
    }
}
