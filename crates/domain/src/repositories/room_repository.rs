//! 房间Repository接口定义

use async_trait::async_trait;

use crate::errors::RepositoryResult;
use crate::membership::Membership;
use crate::room::Room;
use crate::value_objects::{RoomId, UserId};

/// 房间Repository接口
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 创建房间。房间 ID 已存在时返回 `Conflict`。
    async fn create(&self, room: Room) -> RepositoryResult<Room>;

    /// 原子地创建房间和初始成员（createRoom 用例的事务边界）。
    async fn create_with_members(
        &self,
        room: Room,
        members: Vec<Membership>,
    ) -> RepositoryResult<Room>;

    async fn find_by_id(&self, id: &RoomId) -> RepositoryResult<Option<Room>>;

    /// 用户拥有成员关系的全部房间，顺序不作保证。
    async fn list_by_member(&self, user_id: UserId) -> RepositoryResult<Vec<Room>>;

    /// 级联删除：回应 → 消息 → 成员 → 房间，单个事务内完成。
    /// 任何并发操作要么在提交前完成，要么观察到房间已不存在。
    async fn delete_cascade(&self, id: &RoomId) -> RepositoryResult<()>;
}
