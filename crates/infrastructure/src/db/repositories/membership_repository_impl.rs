//! 房间成员Repository实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::{Membership, MembershipRepository, RepositoryResult, RoomId, UserId};

use crate::db::{map_sqlx_err, DbPool};

/// 数据库房间成员模型
#[derive(Debug, FromRow)]
struct MembershipRecord {
    room_id: String,
    user_id: Uuid,
    has_history_access: bool,
    joined_at: DateTime<Utc>,
}

impl From<MembershipRecord> for Membership {
    fn from(record: MembershipRecord) -> Self {
        Membership {
            room_id: RoomId::new(record.room_id),
            user_id: UserId::from(record.user_id),
            has_history_access: record.has_history_access,
            joined_at: record.joined_at,
        }
    }
}

#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: DbPool,
}

impl PgMembershipRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    async fn create(&self, membership: Membership) -> RepositoryResult<Membership> {
        let record = sqlx::query_as::<_, MembershipRecord>(
            r#"
            INSERT INTO room_members (room_id, user_id, has_history_access, joined_at)
            VALUES ($1, $2, $3, $4)
            RETURNING room_id, user_id, has_history_access, joined_at
            "#,
        )
        .bind(membership.room_id.as_str())
        .bind(Uuid::from(membership.user_id))
        .bind(membership.has_history_access)
        .bind(membership.joined_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.into())
    }

    async fn find(
        &self,
        room_id: &RoomId,
        user_id: UserId,
    ) -> RepositoryResult<Option<Membership>> {
        let record = sqlx::query_as::<_, MembershipRecord>(
            r#"
            SELECT room_id, user_id, has_history_access, joined_at
            FROM room_members
            WHERE room_id = $1 AND user_id = $2
            "#,
        )
        .bind(room_id.as_str())
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(Membership::from))
    }

    async fn list_by_room(&self, room_id: &RoomId) -> RepositoryResult<Vec<Membership>> {
        let records = sqlx::query_as::<_, MembershipRecord>(
            r#"
            SELECT room_id, user_id, has_history_access, joined_at
            FROM room_members
            WHERE room_id = $1
            "#,
        )
        .bind(room_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(Membership::from).collect())
    }
}
