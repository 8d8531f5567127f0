//! 聊天核心领域模型
//!
//! 包含房间、成员、消息、回应等核心实体，以及存储契约和相关业务规则。

pub mod errors;
pub mod membership;
pub mod message;
pub mod reaction;
pub mod repositories;
pub mod room;
pub mod user;
pub mod value_objects;

// 重新导出常用类型
pub use errors::{DomainError, DomainResult, RepositoryError, RepositoryResult};
pub use membership::Membership;
pub use message::Message;
pub use reaction::Reaction;
pub use repositories::{
    MembershipRepository, MessageRepository, ReactionRepository, RoomRepository, UserDirectory,
};
pub use room::Room;
pub use user::User;
pub use value_objects::{
    MessageContent, MessageId, ReactionId, RoomId, Timestamp, UserId, GENERAL_ROOM_ID,
};
