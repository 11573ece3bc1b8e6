use crate::DbPool;

/// Create the conversation tables when they do not exist yet. Every
/// statement is idempotent, so this runs unconditionally at startup.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS conversations (
            id TEXT PRIMARY KEY,
            title TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            user_id TEXT,
            restaurant_id TEXT,
            message_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            last_activity TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_messages_conversation_id
         ON messages (conversation_id, id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_conversations_user_id ON conversations (user_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_conversations_last_activity
         ON conversations (last_activity)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::ensure_schema;
    use crate::connect_with_settings;

    #[tokio::test]
    async fn schema_setup_creates_tables_and_is_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");

        ensure_schema(&pool).await.expect("first setup");
        ensure_schema(&pool).await.expect("second setup");

        let count = sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master
             WHERE type = 'table' AND name IN ('conversations', 'messages')",
        )
        .fetch_one(&pool)
        .await
        .expect("count tables")
        .get::<i64, _>("count");

        assert_eq!(count, 2);
    }
}
