//! 领域错误定义
//!
//! 错误分类与网关的处理策略一一对应：NotFound / Forbidden / Conflict /
//! InvalidOperation 作用域限定在发起请求的连接，只有认证失败会断开连接。

use thiserror::Error;

/// 领域错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("room not found")]
    RoomNotFound,

    #[error("message not found")]
    MessageNotFound,

    #[error("user not found")]
    UserNotFound,

    /// (user, room) 成员关系已经存在。
    #[error("user is already a member")]
    MembershipExists,

    /// 只有房主可以删除房间。
    #[error("only the owner can delete this room")]
    NotRoomOwner,

    /// 不允许给自己的消息添加回应。
    #[error("you cannot react to your own message")]
    SelfReaction,

    /// `general` 房间不允许手动管理成员或删除。
    #[error("the general room cannot be modified")]
    GeneralRoomImmutable,

    #[error("{field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 存储层错误类型
///
/// `Conflict` 必须由存储实现基于唯一约束返回，它是回应开关和
/// `general` 房间惰性创建在并发下的仲裁依据。
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("uniqueness conflict")]
    Conflict,

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// 领域结果类型
pub type DomainResult<T> = Result<T, DomainError>;

/// 存储结果类型
pub type RepositoryResult<T> = Result<T, RepositoryError>;
