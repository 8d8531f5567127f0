use serde::{Deserialize, Serialize};

use crate::value_objects::{RoomId, Timestamp, UserId};

/// 房间成员关系。
///
/// 不变式：每个 (user, room) 至多存在一条成员记录，由存储层唯一约束
/// 保证。`has_history_access` 为 false 的成员只能看到自己加入之后的
/// 消息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub has_history_access: bool,
    pub joined_at: Timestamp,
}

impl Membership {
    pub fn new(
        room_id: RoomId,
        user_id: UserId,
        has_history_access: bool,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            room_id,
            user_id,
            has_history_access,
            joined_at,
        }
    }
}
