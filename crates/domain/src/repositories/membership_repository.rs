//! 房间成员Repository接口定义

use async_trait::async_trait;

use crate::errors::RepositoryResult;
use crate::membership::Membership;
use crate::value_objects::{RoomId, UserId};

/// 房间成员Repository接口
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// 创建成员关系。(user, room) 已存在时返回 `Conflict`。
    async fn create(&self, membership: Membership) -> RepositoryResult<Membership>;

    async fn find(&self, room_id: &RoomId, user_id: UserId)
        -> RepositoryResult<Option<Membership>>;

    async fn list_by_room(&self, room_id: &RoomId) -> RepositoryResult<Vec<Membership>>;
}
