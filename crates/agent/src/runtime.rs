use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use maitred_core::domain::conversation::{ConversationId, MessageRole};
use maitred_core::errors::ApplicationError;
use maitred_core::store::{ConversationStore, NewConversation, StoreError};

use crate::llm::{GenerationError, LlmClient};
use crate::pipeline::{ConversationState, Pipeline};

const DEFAULT_CONVERSATION_TITLE: &str = "Assistant conversation";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("response generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl From<AgentError> for ApplicationError {
    fn from(value: AgentError) -> Self {
        match value {
            AgentError::Store(error) => ApplicationError::Persistence(error.to_string()),
            AgentError::Generation(error) => ApplicationError::Generation(error.to_string()),
        }
    }
}

/// Composes classification, dispatch, and the conversation store into
/// the one public operation of the core. Both collaborators are
/// injected at construction; there is no process-global instance.
pub struct AgentRuntime {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn ConversationStore>,
}

impl AgentRuntime {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn ConversationStore>) -> Self {
        Self { llm, store }
    }

    pub fn store(&self) -> &dyn ConversationStore {
        self.store.as_ref()
    }

    /// Handle one user turn and return the assistant's reply.
    ///
    /// Persistence ordering: the user turn is stored before generation
    /// is attempted, and the assistant turn only after generation
    /// succeeds. A generation failure therefore leaves the
    /// conversation with an unanswered user turn; that inconsistency
    /// is documented and accepted rather than rolled back.
    pub async fn handle_user_turn(
        &self,
        conversation_id: &ConversationId,
        user_text: &str,
        user_id: Option<String>,
        restaurant_id: Option<String>,
    ) -> Result<String, AgentError> {
        let record = match self.store.get_conversation(conversation_id).await? {
            Some(record) => record,
            None => {
                self.store
                    .create_conversation(
                        conversation_id,
                        NewConversation {
                            title: Some(DEFAULT_CONVERSATION_TITLE.to_string()),
                            user_id: user_id.clone(),
                            restaurant_id: restaurant_id.clone(),
                        },
                    )
                    .await?
            }
        };

        self.store.append_turn(conversation_id, MessageRole::User, user_text).await?;

        let turns = self.store.list_turns(conversation_id).await?;
        let mut state = ConversationState::new(
            conversation_id.clone(),
            user_id.or(record.user_id),
            restaurant_id.or(record.restaurant_id),
            turns,
        );

        let pipeline = Pipeline::new(self.llm.as_ref());
        let reply = pipeline.run(&mut state).await?;

        self.store.append_turn(conversation_id, MessageRole::Assistant, &reply).await?;

        info!(
            event_name = "agent.turn.completed",
            conversation_id = %conversation_id,
            task = state.current_task.map(|task| task.as_str()).unwrap_or("unset"),
            "assistant reply stored"
        );

        Ok(reply)
    }
}
