//! 内存存储实现
//!
//! 在单个 `RwLock` 后面实现全部存储契约，用于测试和无数据库的
//! 开发模式。写锁临界区天然提供级联删除所需的事务隔离；唯一约束
//! 在插入前检查，和 Postgres 实现返回一致的 `Conflict`。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain::{
    Membership, MembershipRepository, Message, MessageId, MessageRepository, Reaction, ReactionId,
    ReactionRepository, RepositoryError, RepositoryResult, Room, RoomId, RoomRepository, Timestamp,
    User, UserDirectory, UserId,
};

#[derive(Default)]
struct StoreInner {
    users: HashMap<UserId, User>,
    rooms: HashMap<RoomId, Room>,
    memberships: HashMap<(RoomId, UserId), Membership>,
    messages: Vec<Message>,
    reactions: Vec<Reaction>,
}

/// 内存存储。`Clone` 共享同一份数据。
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一个用户（用户资料归外部服务管，测试里直接写入投影）。
    pub async fn insert_user(&self, user: User) {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.id, user);
    }

    /// 当前全部回应的快照，测试断言用。
    pub async fn reaction_snapshot(&self) -> Vec<Reaction> {
        self.inner.read().await.reactions.clone()
    }

    /// 房间的消息数量，测试断言用。
    pub async fn message_count(&self, room_id: &RoomId) -> usize {
        self.inner
            .read()
            .await
            .messages
            .iter()
            .filter(|m| &m.room_id == room_id)
            .count()
    }

    /// 房间的成员数量，测试断言用。
    pub async fn membership_count(&self, room_id: &RoomId) -> usize {
        self.inner
            .read()
            .await
            .memberships
            .keys()
            .filter(|(r, _)| r == room_id)
            .count()
    }
}

#[async_trait]
impl RoomRepository for InMemoryStore {
    async fn create(&self, room: Room) -> RepositoryResult<Room> {
        let mut inner = self.inner.write().await;
        if inner.rooms.contains_key(&room.id) {
            return Err(RepositoryError::Conflict);
        }
        inner.rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn create_with_members(
        &self,
        room: Room,
        members: Vec<Membership>,
    ) -> RepositoryResult<Room> {
        let mut inner = self.inner.write().await;
        if inner.rooms.contains_key(&room.id) {
            return Err(RepositoryError::Conflict);
        }
        if members
            .iter()
            .any(|m| inner.memberships.contains_key(&(m.room_id.clone(), m.user_id)))
        {
            return Err(RepositoryError::Conflict);
        }
        inner.rooms.insert(room.id.clone(), room.clone());
        for member in members {
            inner
                .memberships
                .insert((member.room_id.clone(), member.user_id), member);
        }
        Ok(room)
    }

    async fn find_by_id(&self, id: &RoomId) -> RepositoryResult<Option<Room>> {
        Ok(self.inner.read().await.rooms.get(id).cloned())
    }

    async fn list_by_member(&self, user_id: UserId) -> RepositoryResult<Vec<Room>> {
        let inner = self.inner.read().await;
        Ok(inner
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| inner.rooms.get(&m.room_id).cloned())
            .collect())
    }

    async fn delete_cascade(&self, id: &RoomId) -> RepositoryResult<()> {
        // 单个写锁临界区 = 事务：级联过程中任何读写都被排除在外
        let mut inner = self.inner.write().await;
        if inner.rooms.remove(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        let doomed: Vec<MessageId> = inner
            .messages
            .iter()
            .filter(|m| &m.room_id == id)
            .map(|m| m.id)
            .collect();
        inner.reactions.retain(|r| !doomed.contains(&r.message_id));
        inner.messages.retain(|m| &m.room_id != id);
        inner.memberships.retain(|(room_id, _), _| room_id != id);
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn create(&self, membership: Membership) -> RepositoryResult<Membership> {
        let mut inner = self.inner.write().await;
        if !inner.rooms.contains_key(&membership.room_id) {
            return Err(RepositoryError::NotFound);
        }
        let key = (membership.room_id.clone(), membership.user_id);
        if inner.memberships.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        inner.memberships.insert(key, membership.clone());
        Ok(membership)
    }

    async fn find(
        &self,
        room_id: &RoomId,
        user_id: UserId,
    ) -> RepositoryResult<Option<Membership>> {
        Ok(self
            .inner
            .read()
            .await
            .memberships
            .get(&(room_id.clone(), user_id))
            .cloned())
    }

    async fn list_by_room(&self, room_id: &RoomId) -> RepositoryResult<Vec<Membership>> {
        Ok(self
            .inner
            .read()
            .await
            .memberships
            .values()
            .filter(|m| &m.room_id == room_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn create(&self, message: Message) -> RepositoryResult<Message> {
        let mut inner = self.inner.write().await;
        if !inner.rooms.contains_key(&message.room_id) {
            return Err(RepositoryError::NotFound);
        }
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn find_by_id(&self, id: MessageId) -> RepositoryResult<Option<Message>> {
        Ok(self
            .inner
            .read()
            .await
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn list_by_room(
        &self,
        room_id: &RoomId,
        after: Option<Timestamp>,
    ) -> RepositoryResult<Vec<Message>> {
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| &m.room_id == room_id)
            .filter(|m| after.map_or(true, |cutoff| m.created_at > cutoff))
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }
}

#[async_trait]
impl ReactionRepository for InMemoryStore {
    async fn create(&self, reaction: Reaction) -> RepositoryResult<Reaction> {
        let mut inner = self.inner.write().await;
        if !inner.messages.iter().any(|m| m.id == reaction.message_id) {
            return Err(RepositoryError::NotFound);
        }
        let duplicate = inner.reactions.iter().any(|r| {
            r.message_id == reaction.message_id
                && r.user_id == reaction.user_id
                && r.emoji == reaction.emoji
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        inner.reactions.push(reaction.clone());
        Ok(reaction)
    }

    async fn find_by_key(
        &self,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> RepositoryResult<Option<Reaction>> {
        Ok(self
            .inner
            .read()
            .await
            .reactions
            .iter()
            .find(|r| r.message_id == message_id && r.user_id == user_id && r.emoji == emoji)
            .cloned())
    }

    async fn list_by_message(&self, message_id: MessageId) -> RepositoryResult<Vec<Reaction>> {
        let inner = self.inner.read().await;
        let mut reactions: Vec<Reaction> = inner
            .reactions
            .iter()
            .filter(|r| r.message_id == message_id)
            .cloned()
            .collect();
        reactions.sort_by_key(|r| r.created_at);
        Ok(reactions)
    }

    async fn delete(&self, id: ReactionId) -> RepositoryResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.reactions.len();
        inner.reactions.retain(|r| r.id != id);
        Ok(inner.reactions.len() < before)
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}
