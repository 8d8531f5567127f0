//! 消息服务
//!
//! 只追加的消息日志，以及按成员可见窗口过滤的历史查询。

use std::collections::HashMap;
use std::sync::Arc;

use domain::{
    DomainError, MembershipRepository, Message, MessageContent, MessageId, MessageRepository,
    ReactionRepository, RepositoryError, RoomId, RoomRepository, User, UserDirectory, UserId,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::dto::{MessageView, ReactionView};
use crate::error::ApplicationResult;

pub struct MessageServiceDependencies {
    pub room_repository: Arc<dyn RoomRepository>,
    pub membership_repository: Arc<dyn MembershipRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub reaction_repository: Arc<dyn ReactionRepository>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub clock: Arc<dyn Clock>,
}

pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    /// 持久化一条消息并返回携带作者资料的视图，供即时广播。
    ///
    /// 这一层不做成员校验（调用方已经订阅了房间），但房间必须存在：
    /// 与级联删除竞争的写入要观察到 `RoomNotFound`。
    pub async fn append(
        &self,
        author_id: UserId,
        room_id: RoomId,
        content: String,
    ) -> ApplicationResult<MessageView> {
        let content = MessageContent::new(content)?;

        self.deps
            .room_repository
            .find_by_id(&room_id)
            .await?
            .ok_or(DomainError::RoomNotFound)?;

        let author = self
            .deps
            .user_directory
            .find_by_id(author_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        let message = Message::new(
            MessageId::from(Uuid::new_v4()),
            room_id,
            author_id,
            content,
            self.deps.clock.now(),
        );

        let stored = match self.deps.message_repository.create(message).await {
            Ok(stored) => stored,
            // 存在性检查之后房间被级联删除
            Err(RepositoryError::NotFound) => return Err(DomainError::RoomNotFound.into()),
            Err(err) => return Err(err.into()),
        };

        tracing::debug!(message_id = %stored.id, room_id = %stored.room_id, "message appended");
        Ok(MessageView::bare(stored, author))
    }

    /// 房间历史，按创建时间升序。
    ///
    /// `has_history_access` 为 false 的成员只能看到严格晚于自己
    /// `joined_at` 的消息。没有成员记录的请求者回退到完整历史——
    /// 刻意保留的行为，见 DESIGN.md。
    pub async fn history(
        &self,
        room_id: &RoomId,
        requester_id: UserId,
    ) -> ApplicationResult<Vec<MessageView>> {
        let membership = self
            .deps
            .membership_repository
            .find(room_id, requester_id)
            .await?;

        let after = match &membership {
            Some(member) if !member.has_history_access => Some(member.joined_at),
            Some(_) => None,
            None => {
                tracing::warn!(
                    room_id = %room_id,
                    user_id = %requester_id,
                    "history requested without membership record, returning full history"
                );
                None
            }
        };

        let messages = self
            .deps
            .message_repository
            .list_by_room(room_id, after)
            .await?;

        // 作者与回应发起者的资料按用户去重查询
        let mut users: HashMap<UserId, User> = HashMap::new();
        let mut views = Vec::with_capacity(messages.len());
        for message in messages {
            let author = self.resolve_user(&mut users, message.author_id).await?;
            let reactions = self
                .deps
                .reaction_repository
                .list_by_message(message.id)
                .await?;
            let mut reaction_views = Vec::with_capacity(reactions.len());
            for reaction in reactions {
                let user = self.resolve_user(&mut users, reaction.user_id).await?;
                reaction_views.push(ReactionView::new(reaction, user));
            }
            views.push(MessageView::new(message, author, reaction_views));
        }

        Ok(views)
    }

    async fn resolve_user(
        &self,
        cache: &mut HashMap<UserId, User>,
        user_id: UserId,
    ) -> ApplicationResult<User> {
        if let Some(user) = cache.get(&user_id) {
            return Ok(user.clone());
        }
        let user = self
            .deps
            .user_directory
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        cache.insert(user_id, user.clone());
        Ok(user)
    }
}
