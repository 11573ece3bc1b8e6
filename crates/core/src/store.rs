use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::{ConversationId, ConversationRecord, MessageRole, Turn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationIdDisplay),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Display helper so the error message carries the id without the
/// newtype's Debug noise.
#[derive(Debug)]
pub struct ConversationIdDisplay(pub String);

impl std::fmt::Display for ConversationIdDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl StoreError {
    pub fn not_found(id: &ConversationId) -> Self {
        Self::ConversationNotFound(ConversationIdDisplay(id.0.clone()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct NewConversation {
    pub title: Option<String>,
    pub user_id: Option<String>,
    pub restaurant_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ConversationFilter {
    pub user_id: Option<String>,
    pub restaurant_id: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

/// Port over the persisted conversation history. The pipeline itself
/// never mutates stored state; all writes go through this trait, and
/// turns are appended in the order they are produced.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<ConversationRecord>, StoreError>;

    /// Create a record with default fields. Callers use get-then-create;
    /// the store does not enforce uniqueness beyond the primary key.
    async fn create_conversation(
        &self,
        id: &ConversationId,
        fields: NewConversation,
    ) -> Result<ConversationRecord, StoreError>;

    /// Append one turn and bump the conversation's message count and
    /// last-activity timestamp. Fails if the record does not exist.
    async fn append_turn(
        &self,
        id: &ConversationId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), StoreError>;

    /// Turns in append order, oldest first.
    async fn list_turns(&self, id: &ConversationId) -> Result<Vec<Turn>, StoreError>;

    async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> Result<Vec<ConversationRecord>, StoreError>;
}
