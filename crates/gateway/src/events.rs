//! 网关线缆协议
//!
//! 入站和出站事件都是带标签的 serde 枚举：格式不合法的帧在反序列化
//! 阶段就被拒绝，不会触达任何服务。字段名一律 camelCase。

use serde::{Deserialize, Serialize};

use application::{MessageView, ReactionView};
use domain::{MessageId, ReactionId, Room, RoomId, UserId};

/// 客户端 → 服务端
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    CreateRoom {
        name: String,
        member_ids: Vec<UserId>,
        history_access: bool,
    },

    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    SendMessage { room_id: RoomId, content: String },

    #[serde(rename_all = "camelCase")]
    Typing { room_id: RoomId, is_typing: bool },

    #[serde(rename_all = "camelCase")]
    AddReaction {
        message_id: MessageId,
        emoji: String,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    AddMember {
        room_id: RoomId,
        username: String,
        has_history_access: bool,
    },

    #[serde(rename_all = "camelCase")]
    DeleteRoom { room_id: RoomId },

    ProfileUpdated {},
}

/// 服务端 → 客户端
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    RoomsList(Vec<Room>),

    RoomCreated(Room),

    #[serde(rename_all = "camelCase")]
    AddedToRoom { room: Room, user_id: UserId },

    #[serde(rename_all = "camelCase")]
    History {
        room_id: RoomId,
        messages: Vec<MessageView>,
    },

    NewMessage(MessageView),

    ReactionAdded(ReactionView),

    #[serde(rename_all = "camelCase")]
    ReactionRemoved {
        message_id: MessageId,
        reaction_id: ReactionId,
        user_id: UserId,
        emoji: String,
    },

    #[serde(rename_all = "camelCase")]
    UserTyping {
        username: String,
        is_typing: bool,
        user_id: UserId,
        room_id: RoomId,
    },

    #[serde(rename_all = "camelCase")]
    MemberAdded { success: bool },

    #[serde(rename_all = "camelCase")]
    RoomDeleted { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    UserUpdated { user_id: UserId },

    Error { message: String },
}
