use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use maitred_core::domain::conversation::{
    ConversationId, ConversationRecord, ConversationStatus, MessageRole, Turn,
};
use maitred_core::store::{
    ConversationFilter, ConversationStore, NewConversation, StoreError,
};

use super::DEFAULT_LIST_LIMIT;

/// Map-backed store for tests and the doctor command. Same observable
/// behavior as the SQL store, minus durability.
#[derive(Default)]
pub struct InMemoryConversationStore {
    inner: RwLock<HashMap<String, Entry>>,
}

struct Entry {
    record: ConversationRecord,
    turns: Vec<Turn>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<ConversationRecord>, StoreError> {
        Ok(self.inner.read().await.get(&id.0).map(|entry| entry.record.clone()))
    }

    async fn create_conversation(
        &self,
        id: &ConversationId,
        fields: NewConversation,
    ) -> Result<ConversationRecord, StoreError> {
        let now = Utc::now();
        let record = ConversationRecord {
            id: id.clone(),
            title: fields.title,
            status: ConversationStatus::Active,
            user_id: fields.user_id,
            restaurant_id: fields.restaurant_id,
            message_count: 0,
            created_at: now,
            last_activity: now,
        };

        self.inner
            .write()
            .await
            .insert(id.0.clone(), Entry { record: record.clone(), turns: Vec::new() });
        Ok(record)
    }

    async fn append_turn(
        &self,
        id: &ConversationId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let entry = inner.get_mut(&id.0).ok_or_else(|| StoreError::not_found(id))?;

        let turn = Turn::new(role, content);
        entry.record.message_count += 1;
        entry.record.last_activity = turn.created_at;
        entry.turns.push(turn);
        Ok(())
    }

    async fn list_turns(&self, id: &ConversationId) -> Result<Vec<Turn>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .get(&id.0)
            .map(|entry| entry.turns.clone())
            .unwrap_or_default())
    }

    async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> Result<Vec<ConversationRecord>, StoreError> {
        let limit = if filter.limit == 0 { DEFAULT_LIST_LIMIT } else { filter.limit };

        let mut records: Vec<ConversationRecord> = self
            .inner
            .read()
            .await
            .values()
            .map(|entry| entry.record.clone())
            .filter(|record| {
                filter.user_id.as_deref().map_or(true, |user| record.user_id.as_deref() == Some(user))
            })
            .filter(|record| {
                filter
                    .restaurant_id
                    .as_deref()
                    .map_or(true, |restaurant| record.restaurant_id.as_deref() == Some(restaurant))
            })
            .collect();

        records.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(records
            .into_iter()
            .skip(filter.offset as usize)
            .take(limit as usize)
            .collect())
    }
}
