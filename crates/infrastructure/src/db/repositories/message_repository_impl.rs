//! 消息Repository实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::{
    Message, MessageContent, MessageId, MessageRepository, RepositoryError, RepositoryResult,
    RoomId, Timestamp, UserId,
};

use crate::db::{map_sqlx_err, DbPool};

/// 数据库消息模型
#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    room_id: String,
    author_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        let content = MessageContent::new(record.content)
            .map_err(|err| RepositoryError::storage(err.to_string()))?;
        Ok(Message {
            id: MessageId::from(record.id),
            room_id: RoomId::new(record.room_id),
            author_id: UserId::from(record.author_id),
            content,
            created_at: record.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: DbPool,
}

impl PgMessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: Message) -> RepositoryResult<Message> {
        // 房间被并发级联删除时外键失败，map_sqlx_err 映射为 NotFound
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (id, room_id, author_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, room_id, author_id, content, created_at
            "#,
        )
        .bind(Uuid::from(message.id))
        .bind(message.room_id.as_str())
        .bind(Uuid::from(message.author_id))
        .bind(message.content.as_str())
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Message::try_from(record)
    }

    async fn find_by_id(&self, id: MessageId) -> RepositoryResult<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT id, room_id, author_id, content, created_at FROM messages WHERE id = $1"#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Message::try_from).transpose()
    }

    async fn list_by_room(
        &self,
        room_id: &RoomId,
        after: Option<Timestamp>,
    ) -> RepositoryResult<Vec<Message>> {
        let records = match after {
            Some(cutoff) => {
                sqlx::query_as::<_, MessageRecord>(
                    r#"
                    SELECT id, room_id, author_id, content, created_at
                    FROM messages
                    WHERE room_id = $1 AND created_at > $2
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(room_id.as_str())
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, MessageRecord>(
                    r#"
                    SELECT id, room_id, author_id, content, created_at
                    FROM messages
                    WHERE room_id = $1
                    ORDER BY created_at ASC
                    "#,
                )
                .bind(room_id.as_str())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Message::try_from).collect()
    }
}
