use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{RoomId, Timestamp, UserId};

/// 聊天房间。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: Timestamp,
}

impl Room {
    pub const MAX_NAME_LEN: usize = 100;

    pub fn new(
        id: RoomId,
        name: impl Into<String>,
        owner_id: UserId,
        created_at: Timestamp,
    ) -> Result<Self, DomainError> {
        let name = Self::validate_name(name.into())?;
        Ok(Self {
            id,
            name,
            owner_id,
            created_at,
        })
    }

    /// 构造保留的 `general` 房间，第一个加入者成为房主。
    pub fn general(owner_id: UserId, created_at: Timestamp) -> Self {
        Self {
            id: RoomId::general(),
            name: "General".to_owned(),
            owner_id,
            created_at,
        }
    }

    fn validate_name(name: String) -> Result<String, DomainError> {
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(DomainError::invalid_argument("room_name", "cannot be empty"));
        }
        if name.chars().count() > Self::MAX_NAME_LEN {
            return Err(DomainError::invalid_argument("room_name", "too long"));
        }
        Ok(name)
    }
}
