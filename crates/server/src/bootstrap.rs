use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use maitred_agent::llm::OpenAiChatClient;
use maitred_agent::runtime::AgentRuntime;
use maitred_core::config::{AppConfig, ConfigError, LoadOptions};
use maitred_db::{connect_with_settings, schema, DbPool, SqlConversationStore};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("schema setup failed: {0}")]
    Schema(#[source] sqlx::Error),
    #[error("llm client construction failed: {0}")]
    Llm(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    schema::ensure_schema(&db_pool).await.map_err(BootstrapError::Schema)?;
    info!(event_name = "system.bootstrap.schema_ready", "conversation tables available");

    let llm = OpenAiChatClient::new(
        config.llm.api_key.clone(),
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        config.llm.timeout_secs,
        config.llm.temperature,
    )
    .map_err(|error| BootstrapError::Llm(error.to_string()))?;

    let store = SqlConversationStore::new(db_pool.clone());
    let runtime = Arc::new(AgentRuntime::new(Arc::new(llm), Arc::new(store)));

    Ok(Application { config, db_pool, runtime })
}

#[cfg(test)]
mod tests {
    use maitred_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::bootstrap;

    fn valid_options(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                llm_api_key: Some("sk-test".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_creates_conversation_tables() {
        let app = bootstrap(valid_options("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('conversations', 'messages')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected conversation tables to be available after bootstrap");
        assert_eq!(table_count, 2);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_llm_credentials() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("llm.api_key"));
    }
}
