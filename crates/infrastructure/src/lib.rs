//! 基础设施层实现。
//!
//! 存储契约的两套实现：PostgreSQL（生产）和内存（测试、无数据库的
//! 开发模式）。

pub mod db;
pub mod memory;

pub use db::repositories::{
    PgMembershipRepository, PgMessageRepository, PgReactionRepository, PgRoomRepository,
    PgUserDirectory,
};
pub use db::{create_pg_pool, DbPool};
pub use memory::InMemoryStore;
