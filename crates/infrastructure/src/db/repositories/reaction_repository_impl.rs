//! 回应Repository实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::{
    MessageId, Reaction, ReactionId, ReactionRepository, RepositoryResult, UserId,
};

use crate::db::{map_sqlx_err, DbPool};

/// 数据库回应模型
#[derive(Debug, FromRow)]
struct ReactionRecord {
    id: Uuid,
    message_id: Uuid,
    user_id: Uuid,
    emoji: String,
    created_at: DateTime<Utc>,
}

impl From<ReactionRecord> for Reaction {
    fn from(record: ReactionRecord) -> Self {
        Reaction {
            id: ReactionId::from(record.id),
            message_id: MessageId::from(record.message_id),
            user_id: UserId::from(record.user_id),
            emoji: record.emoji,
            created_at: record.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgReactionRepository {
    pool: DbPool,
}

impl PgReactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    async fn create(&self, reaction: Reaction) -> RepositoryResult<Reaction> {
        // (user_id, message_id, emoji) 唯一索引是开关的并发仲裁者，
        // 冲突由 map_sqlx_err 映射为 Conflict 交给服务层恢复
        let record = sqlx::query_as::<_, ReactionRecord>(
            r#"
            INSERT INTO reactions (id, message_id, user_id, emoji, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, message_id, user_id, emoji, created_at
            "#,
        )
        .bind(Uuid::from(reaction.id))
        .bind(Uuid::from(reaction.message_id))
        .bind(Uuid::from(reaction.user_id))
        .bind(&reaction.emoji)
        .bind(reaction.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.into())
    }

    async fn find_by_key(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> RepositoryResult<Option<Reaction>> {
        let record = sqlx::query_as::<_, ReactionRecord>(
            r#"
            SELECT id, message_id, user_id, emoji, created_at
            FROM reactions
            WHERE message_id = $1 AND user_id = $2 AND emoji = $3
            "#,
        )
        .bind(Uuid::from(message_id))
        .bind(Uuid::from(user_id))
        .bind(emoji)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(Reaction::from))
    }

    async fn list_by_message(&self, message_id: MessageId) -> RepositoryResult<Vec<Reaction>> {
        let records = sqlx::query_as::<_, ReactionRecord>(
            r#"
            SELECT id, message_id, user_id, emoji, created_at
            FROM reactions
            WHERE message_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(Uuid::from(message_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(Reaction::from).collect())
    }

    async fn delete(&self, id: ReactionId) -> RepositoryResult<bool> {
        let result = sqlx::query(r#"DELETE FROM reactions WHERE id = $1"#)
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        Ok(result.rows_affected() > 0)
    }
}
