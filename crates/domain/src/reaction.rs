use serde::{Deserialize, Serialize};

use crate::value_objects::{MessageId, ReactionId, Timestamp, UserId};

/// 消息回应。
///
/// 不变式：每个 (user, message, emoji) 三元组至多存在一条记录，
/// 这个唯一键就是回应开关的判定依据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: ReactionId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub emoji: String,
    pub created_at: Timestamp,
}

impl Reaction {
    pub fn new(
        id: ReactionId,
        message_id: MessageId,
        user_id: UserId,
        emoji: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            message_id,
            user_id,
            emoji: emoji.into(),
            created_at,
        }
    }
}
