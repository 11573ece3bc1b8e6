use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use maitred_core::domain::conversation::{
    ConversationId, ConversationRecord, ConversationStatus, MessageRole, Turn,
};
use maitred_core::store::{
    ConversationFilter, ConversationStore, NewConversation, StoreError,
};

use super::DEFAULT_LIST_LIMIT;
use crate::DbPool;

/// SQLite-backed conversation store. One row per conversation header
/// plus an append-only message table; the header's `message_count` and
/// `last_activity` are updated in the same transaction as each append.
pub struct SqlConversationStore {
    pool: DbPool,
}

impl SqlConversationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationStore for SqlConversationStore {
    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<ConversationRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT
                id,
                title,
                status,
                user_id,
                restaurant_id,
                message_count,
                created_at,
                last_activity
             FROM conversations
             WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(record_from_row).transpose()
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

        sqlx::query(
            "INSERT INTO conversations (
                id,
                title,
                status,
                user_id,
                restaurant_id,
                message_count,
                created_at,
                last_activity
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id.0)
        .bind(record.title.as_deref())
        .bind(record.status.as_str())
        .bind(record.user_id.as_deref())
        .bind(record.restaurant_id.as_deref())
        .bind(i64::from(record.message_count))
        .bind(record.created_at.to_rfc3339())
        .bind(record.last_activity.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(record)
    }

    async fn append_turn(
        &self,
        id: &ConversationId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        let updated = sqlx::query(
            "UPDATE conversations
             SET message_count = message_count + 1, last_activity = ?
             WHERE id = ?",
        )
        .bind(&now)
        .bind(&id.0)
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::not_found(id));
        }

        sqlx::query(
            "INSERT INTO messages (conversation_id, role, content, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&id.0)
        .bind(role.as_str())
        .bind(content)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(unavailable)?;

        tx.commit().await.map_err(unavailable)
    }

    async fn list_turns(&self, id: &ConversationId) -> Result<Vec<Turn>, StoreError> {
        let rows = sqlx::query(
            "SELECT role, content, created_at
             FROM messages
             WHERE conversation_id = ?
             ORDER BY id ASC",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.into_iter().map(turn_from_row).collect()
    }

    async fn list_conversations(
        &self,
        filter: ConversationFilter,
    ) -> Result<Vec<ConversationRecord>, StoreError> {
        let limit = if filter.limit == 0 { DEFAULT_LIST_LIMIT } else { filter.limit };

        let rows = sqlx::query(
            "SELECT
                id,
                title,
                status,
                user_id,
                restaurant_id,
                message_count,
                created_at,
                last_activity
             FROM conversations
             WHERE (? IS NULL OR user_id = ?)
               AND (? IS NULL OR restaurant_id = ?)
             ORDER BY last_activity DESC
             LIMIT ? OFFSET ?",
        )
        .bind(filter.user_id.as_deref())
        .bind(filter.user_id.as_deref())
        .bind(filter.restaurant_id.as_deref())
        .bind(filter.restaurant_id.as_deref())
        .bind(i64::from(limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.into_iter().map(record_from_row).collect()
    }
}

fn unavailable(error: sqlx::Error) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

fn record_from_row(row: SqliteRow) -> Result<ConversationRecord, StoreError> {
    let status_raw = row.try_get::<String, _>("status").map_err(decode)?;
    let status = ConversationStatus::parse(&status_raw).ok_or_else(|| {
        StoreError::Decode(format!("unknown conversation status `{status_raw}`"))
    })?;

    Ok(ConversationRecord {
        id: ConversationId(row.try_get("id").map_err(decode)?),
        title: row.try_get("title").map_err(decode)?,
        status,
        user_id: row.try_get("user_id").map_err(decode)?,
        restaurant_id: row.try_get("restaurant_id").map_err(decode)?,
        message_count: parse_u32("message_count", row.try_get("message_count").map_err(decode)?)?,
        created_at: parse_timestamp("created_at", row.try_get("created_at").map_err(decode)?)?,
        last_activity: parse_timestamp(
            "last_activity",
            row.try_get("last_activity").map_err(decode)?,
        )?,
    })
}

fn turn_from_row(row: SqliteRow) -> Result<Turn, StoreError> {
    let role_raw = row.try_get::<String, _>("role").map_err(decode)?;
    let role = MessageRole::parse(&role_raw)
        .ok_or_else(|| StoreError::Decode(format!("unknown message role `{role_raw}`")))?;

    Ok(Turn {
        role,
        content: row.try_get("content").map_err(decode)?,
        created_at: parse_timestamp("created_at", row.try_get("created_at").map_err(decode)?)?,
    })
}

fn decode(error: sqlx::Error) -> StoreError {
    StoreError::Decode(error.to_string())
}

fn parse_u32(column: &str, value: i64) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| {
        StoreError::Decode(format!(
            "invalid value for `{column}` (expected non-negative u32): {value}"
        ))
    })
}

fn parse_timestamp(column: &str, value: String) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| {
            StoreError::Decode(format!("invalid timestamp in `{column}`: `{value}` ({error})"))
        })
}
