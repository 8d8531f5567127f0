//! 用户目录实现
//!
//! users 表由外部用户服务维护，这里只做只读查询。

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use domain::{RepositoryResult, User, UserDirectory, UserId};

use crate::db::{map_sqlx_err, DbPool};

#[derive(Debug, FromRow)]
struct UserRecord {
    id: Uuid,
    username: String,
    color: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: UserId::from(record.id),
            username: record.username,
            color: record.color,
        }
    }
}

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: DbPool,
}

impl PgUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let record =
            sqlx::query_as::<_, UserRecord>(r#"SELECT id, username, color FROM users WHERE id = $1"#)
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_err)?;

        Ok(record.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"SELECT id, username, color FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(User::from))
    }
}
