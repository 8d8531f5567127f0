//! 回应服务
//!
//! 每用户每表情的开关语义：同一个 (user, message, emoji) 键上的
//! 第二次操作撤销第一次。

use std::sync::Arc;

use domain::{
    DomainError, MessageId, MessageRepository, Reaction, ReactionId, ReactionRepository,
    RepositoryError, UserDirectory, UserId,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::dto::ReactionView;
use crate::error::ApplicationResult;

/// 开关的两种互斥结果。
///
/// `Removed` 只携带撤销缓存条目所需的键，`Added` 携带完整记录
/// 和发起者资料供展示。
#[derive(Debug, Clone)]
pub enum ReactionToggle {
    Added(ReactionView),
    Removed {
        message_id: MessageId,
        reaction_id: ReactionId,
        user_id: UserId,
        emoji: String,
    },
}

pub struct ReactionServiceDependencies {
    pub message_repository: Arc<dyn MessageRepository>,
    pub reaction_repository: Arc<dyn ReactionRepository>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub clock: Arc<dyn Clock>,
}

pub struct ReactionService {
    deps: ReactionServiceDependencies,
}

impl ReactionService {
    pub fn new(deps: ReactionServiceDependencies) -> Self {
        Self { deps }
    }

    /// 切换 (user, message, emoji) 上的回应。
    ///
    /// 并发规则：唯一约束是仲裁者。插入输给并发插入时重读并执行
    /// 互补的删除；删除扑空时按互补的插入处理。两个并发开关的最终
    /// 效果等价于任意串行顺序。
    pub async fn toggle(
        &self,
        user_id: UserId,
        message_id: MessageId,
        emoji: &str,
    ) -> ApplicationResult<ReactionToggle> {
        let message = self
            .deps
            .message_repository
            .find_by_id(message_id)
            .await?
            .ok_or(DomainError::MessageNotFound)?;

        if message.author_id == user_id {
            return Err(DomainError::SelfReaction.into());
        }

        if let Some(existing) = self
            .deps
            .reaction_repository
            .find_by_key(message_id, user_id, emoji)
            .await?
        {
            if self.deps.reaction_repository.delete(existing.id).await? {
                return Ok(ReactionToggle::Removed {
                    message_id,
                    reaction_id: existing.id,
                    user_id,
                    emoji: existing.emoji,
                });
            }
            // 删除扑空：并发开关抢先移除了记录，继续走插入分支
        }

        let reaction = Reaction::new(
            ReactionId::from(Uuid::new_v4()),
            message_id,
            user_id,
            emoji,
            self.deps.clock.now(),
        );

        match self.deps.reaction_repository.create(reaction).await {
            Ok(created) => {
                let user = self
                    .deps
                    .user_directory
                    .find_by_id(user_id)
                    .await?
                    .ok_or(DomainError::UserNotFound)?;
                Ok(ReactionToggle::Added(ReactionView::new(created, user)))
            }
            Err(RepositoryError::Conflict) => {
                // 插入输给并发插入，重读后执行互补的删除
                let existing = self
                    .deps
                    .reaction_repository
                    .find_by_key(message_id, user_id, emoji)
                    .await?
                    .ok_or_else(|| RepositoryError::storage("reaction vanished after conflict"))?;
                let _ = self.deps.reaction_repository.delete(existing.id).await?;
                Ok(ReactionToggle::Removed {
                    message_id,
                    reaction_id: existing.id,
                    user_id,
                    emoji: existing.emoji,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
