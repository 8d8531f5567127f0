//! 消息Repository接口定义

use async_trait::async_trait;

use crate::errors::RepositoryResult;
use crate::message::Message;
use crate::value_objects::{MessageId, RoomId, Timestamp};

/// 消息Repository接口
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 持久化一条消息。所属房间已被删除时返回 `NotFound`。
    async fn create(&self, message: Message) -> RepositoryResult<Message>;

    async fn find_by_id(&self, id: MessageId) -> RepositoryResult<Option<Message>>;

    /// 按创建时间升序列出房间消息；`after` 给定时只返回严格晚于
    /// 该时刻的消息（历史可见窗口）。
    async fn list_by_room(
        &self,
        room_id: &RoomId,
        after: Option<Timestamp>,
    ) -> RepositoryResult<Vec<Message>>;
}
