//! 房间服务
//!
//! 实现房间生命周期与成员管理：创建、加入（含 `general` 的惰性创建）、
//! 添加成员、删除（级联）。

use std::sync::Arc;

use domain::{
    DomainError, Membership, MembershipRepository, RepositoryError, Room, RoomId, RoomRepository,
    User, UserDirectory, UserId,
};

use crate::clock::Clock;
use crate::error::ApplicationResult;

#[derive(Debug, Clone)]
pub struct CreateRoomRequest {
    pub name: String,
    pub owner_id: UserId,
    pub member_ids: Vec<UserId>,
    /// 列出的成员是否能看到加入前的历史，房主恒为 true。
    pub history_access_default: bool,
}

/// addMember 的结果：成员关系连同解析出的用户和房间，供广播使用。
#[derive(Debug, Clone)]
pub struct AddedMember {
    pub membership: Membership,
    pub user: User,
    pub room: Room,
}

pub struct RoomServiceDependencies {
    pub room_repository: Arc<dyn RoomRepository>,
    pub membership_repository: Arc<dyn MembershipRepository>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub clock: Arc<dyn Clock>,
}

pub struct RoomService {
    deps: RoomServiceDependencies,
}

impl RoomService {
    pub fn new(deps: RoomServiceDependencies) -> Self {
        Self { deps }
    }

    /// 用户拥有成员关系的全部房间。
    pub async fn get_user_rooms(&self, user_id: UserId) -> ApplicationResult<Vec<Room>> {
        Ok(self.deps.room_repository.list_by_member(user_id).await?)
    }

    pub async fn create_room(&self, request: CreateRoomRequest) -> ApplicationResult<Room> {
        let now = self.deps.clock.now();
        let room = Room::new(RoomId::random(), request.name, request.owner_id, now)?;

        // 房主始终可见完整历史；member_ids 里重复的或等于房主的条目跳过
        let mut members = vec![Membership::new(room.id.clone(), request.owner_id, true, now)];
        for member_id in request.member_ids {
            if members.iter().any(|m| m.user_id == member_id) {
                continue;
            }
            members.push(Membership::new(
                room.id.clone(),
                member_id,
                request.history_access_default,
                now,
            ));
        }

        let created = self
            .deps
            .room_repository
            .create_with_members(room, members)
            .await?;

        tracing::info!(room_id = %created.id, owner_id = %created.owner_id, "room created");
        Ok(created)
    }

    /// 加入房间，幂等。
    ///
    /// `general` 不存在时先惰性创建，第一个加入者成为房主；并发创建
    /// 由房间 ID 的唯一约束仲裁，输掉的一方沿用已有房间。
    pub async fn join_room(&self, room_id: RoomId, user_id: UserId) -> ApplicationResult<Membership> {
        if self
            .deps
            .room_repository
            .find_by_id(&room_id)
            .await?
            .is_none()
        {
            if !room_id.is_general() {
                return Err(DomainError::RoomNotFound.into());
            }
            let general = Room::general(user_id, self.deps.clock.now());
            match self.deps.room_repository.create(general).await {
                Ok(room) => {
                    tracing::info!(owner_id = %room.owner_id, "general room lazily created");
                }
                Err(RepositoryError::Conflict) => {}
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(existing) = self
            .deps
            .membership_repository
            .find(&room_id, user_id)
            .await?
        {
            return Ok(existing);
        }

        let membership = Membership::new(room_id.clone(), user_id, true, self.deps.clock.now());
        match self.deps.membership_repository.create(membership).await {
            Ok(created) => Ok(created),
            // 并发加入撞上 (user, room) 唯一键，重读即可
            Err(RepositoryError::Conflict) => self
                .deps
                .membership_repository
                .find(&room_id, user_id)
                .await?
                .ok_or_else(|| {
                    RepositoryError::storage("membership vanished after conflict").into()
                }),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn add_member(
        &self,
        room_id: RoomId,
        username: &str,
        has_history_access: bool,
    ) -> ApplicationResult<AddedMember> {
        if room_id.is_general() {
            return Err(DomainError::GeneralRoomImmutable.into());
        }

        let room = self
            .deps
            .room_repository
            .find_by_id(&room_id)
            .await?
            .ok_or(DomainError::RoomNotFound)?;

        let user = self
            .deps
            .user_directory
            .find_by_username(username)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        if self
            .deps
            .membership_repository
            .find(&room_id, user.id)
            .await?
            .is_some()
        {
            return Err(DomainError::MembershipExists.into());
        }

        let membership = Membership::new(
            room_id,
            user.id,
            has_history_access,
            self.deps.clock.now(),
        );
        let membership = match self.deps.membership_repository.create(membership).await {
            Ok(created) => created,
            Err(RepositoryError::Conflict) => return Err(DomainError::MembershipExists.into()),
            Err(err) => return Err(err.into()),
        };

        Ok(AddedMember {
            membership,
            user,
            room,
        })
    }

    /// 删除房间，只有房主可以执行，`general` 永不可删。
    ///
    /// 级联（回应 → 消息 → 成员 → 房间）由存储层在单个事务内完成。
    pub async fn delete_room(&self, room_id: &RoomId, user_id: UserId) -> ApplicationResult<()> {
        if room_id.is_general() {
            return Err(DomainError::GeneralRoomImmutable.into());
        }

        let room = self
            .deps
            .room_repository
            .find_by_id(room_id)
            .await?
            .ok_or(DomainError::RoomNotFound)?;

        if room.owner_id != user_id {
            return Err(DomainError::NotRoomOwner.into());
        }

        match self.deps.room_repository.delete_cascade(room_id).await {
            Ok(()) => {
                tracing::info!(room_id = %room_id, "room deleted with cascade");
                Ok(())
            }
            // 级联开始前被并发删除
            Err(RepositoryError::NotFound) => Err(DomainError::RoomNotFound.into()),
            Err(err) => Err(err.into()),
        }
    }

    /// 房间的全部成员关系。
    pub async fn list_members(&self, room_id: &RoomId) -> ApplicationResult<Vec<Membership>> {
        Ok(self.deps.membership_repository.list_by_room(room_id).await?)
    }
}
