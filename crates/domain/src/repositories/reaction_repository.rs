//! 回应Repository接口定义

use async_trait::async_trait;

use crate::errors::RepositoryResult;
use crate::reaction::Reaction;
use crate::value_objects::{MessageId, ReactionId, UserId};

/// 回应Repository接口
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// 创建回应。(user, message, emoji) 三元组已存在时返回 `Conflict`，
    /// 调用方依赖这个约束来串行化并发的开关操作。
    async fn create(&self, reaction: Reaction) -> RepositoryResult<Reaction>;

    async fn find_by_key(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> RepositoryResult<Option<Reaction>>;

    async fn list_by_message(&self, message_id: MessageId) -> RepositoryResult<Vec<Reaction>>;

    /// 删除回应，返回是否确实删除了一条记录。
    async fn delete(&self, id: ReactionId) -> RepositoryResult<bool>;
}
