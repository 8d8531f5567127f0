//! 数据库连接管理

pub mod repositories;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use domain::RepositoryError;

/// 数据库连接池类型
pub type DbPool = PgPool;

/// 创建 PostgreSQL 连接池
pub async fn create_pg_pool(url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
}

/// 统一的 sqlx 错误映射。
///
/// 唯一约束冲突必须映射为 `Conflict`（回应开关和 `general` 惰性创建
/// 的并发仲裁依赖它），外键失败映射为 `NotFound`（与级联删除竞争的
/// 写入按房间已不存在处理）。
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict;
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::storage(err.to_string())
}
