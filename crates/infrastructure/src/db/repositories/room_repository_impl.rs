//! 房间Repository实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::{
    Membership, RepositoryResult, Room, RoomId, RoomRepository, UserId,
};

use crate::db::{map_sqlx_err, DbPool};

/// 数据库房间模型
#[derive(Debug, FromRow)]
struct RoomRecord {
    id: String,
    name: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<RoomRecord> for Room {
    fn from(record: RoomRecord) -> Self {
        Room {
            id: RoomId::new(record.id),
            name: record.name,
            owner_id: UserId::from(record.owner_id),
            created_at: record.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgRoomRepository {
    pool: DbPool,
}

impl PgRoomRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    async fn create(&self, room: Room) -> RepositoryResult<Room> {
        let record = sqlx::query_as::<_, RoomRecord>(
            r#"
            INSERT INTO rooms (id, name, owner_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(room.id.as_str())
        .bind(&room.name)
        .bind(Uuid::from(room.owner_id))
        .bind(room.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.into())
    }

    async fn create_with_members(
        &self,
        room: Room,
        members: Vec<Membership>,
    ) -> RepositoryResult<Room> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        let record = sqlx::query_as::<_, RoomRecord>(
            r#"
            INSERT INTO rooms (id, name, owner_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(room.id.as_str())
        .bind(&room.name)
        .bind(Uuid::from(room.owner_id))
        .bind(room.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        for member in &members {
            sqlx::query(
                r#"
                INSERT INTO room_members (room_id, user_id, has_history_access, joined_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(member.room_id.as_str())
            .bind(Uuid::from(member.user_id))
            .bind(member.has_history_access)
            .bind(member.joined_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(record.into())
    }

    async fn find_by_id(&self, id: &RoomId) -> RepositoryResult<Option<Room>> {
        let record = sqlx::query_as::<_, RoomRecord>(
            r#"SELECT id, name, owner_id, created_at FROM rooms WHERE id = $1"#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(Room::from))
    }

    async fn list_by_member(&self, user_id: UserId) -> RepositoryResult<Vec<Room>> {
        let records = sqlx::query_as::<_, RoomRecord>(
            r#"
            SELECT r.id, r.name, r.owner_id, r.created_at
            FROM rooms r
            JOIN room_members m ON m.room_id = r.id
            WHERE m.user_id = $1
            "#,
        )
        .bind(Uuid::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(Room::from).collect())
    }

    async fn delete_cascade(&self, id: &RoomId) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;

        // FOR UPDATE 锁住房间行：并发的消息/成员/回应写入在外键检查处
        // 排队，提交后它们观察到房间已不存在（NotFound）
        let locked: Option<(String,)> =
            sqlx::query_as(r#"SELECT id FROM rooms WHERE id = $1 FOR UPDATE"#)
                .bind(id.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;

        if locked.is_none() {
            return Err(domain::RepositoryError::NotFound);
        }

        sqlx::query(
            r#"
            DELETE FROM reactions
            USING messages
            WHERE reactions.message_id = messages.id AND messages.room_id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        sqlx::query(r#"DELETE FROM messages WHERE room_id = $1"#)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        sqlx::query(r#"DELETE FROM room_members WHERE room_id = $1"#)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        sqlx::query(r#"DELETE FROM rooms WHERE id = $1"#)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        tracing::debug!(room_id = %id, "cascade delete committed");
        Ok(())
    }
}
