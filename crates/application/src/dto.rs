//! 面向网关的展示模型
//!
//! 消息和回应在推送给客户端之前需要附带发起者的用户资料，
//! 这里的视图类型就是广播和历史推送使用的载荷形态。

use serde::{Deserialize, Serialize};

use domain::{Message, MessageId, Reaction, ReactionId, RoomId, Timestamp, User, UserId};

/// 带发起者资料的回应视图。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionView {
    pub id: ReactionId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub emoji: String,
    pub created_at: Timestamp,
    pub user: User,
}

impl ReactionView {
    pub fn new(reaction: Reaction, user: User) -> Self {
        Self {
            id: reaction.id,
            message_id: reaction.message_id,
            user_id: reaction.user_id,
            emoji: reaction.emoji,
            created_at: reaction.created_at,
            user,
        }
    }
}

/// 带作者资料和回应列表的消息视图。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: MessageId,
    pub room_id: RoomId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: Timestamp,
    pub author: User,
    pub reactions: Vec<ReactionView>,
}

impl MessageView {
    pub fn new(message: Message, author: User, reactions: Vec<ReactionView>) -> Self {
        Self {
            id: message.id,
            room_id: message.room_id,
            author_id: message.author_id,
            content: message.content.into(),
            created_at: message.created_at,
            author,
            reactions,
        }
    }

    /// 刚持久化的消息还没有任何回应。
    pub fn bare(message: Message, author: User) -> Self {
        Self::new(message, author, Vec::new())
    }
}
