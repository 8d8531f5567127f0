//! 网关调度器
//!
//! 边界编排：把校验过的入站事件分发给用例服务，并按事件类型把结果
//! 路由到正确的受众——发起连接、房间订阅集合、或全部连接。服务错误
//! 只回发给发起连接，从不广播。

use std::sync::Arc;

use application::{
    ApplicationError, CreateRoomRequest, MessageService, ReactionService, ReactionToggle,
    RoomService,
};
use domain::{RoomId, UserId};

use crate::auth::AuthenticatedUser;
use crate::error::scoped_error;
use crate::events::{ClientEvent, ServerEvent};
use crate::registry::{ConnectionId, ConnectionRegistry, OutboundSender};

pub struct GatewayDispatcher {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomService>,
    messages: Arc<MessageService>,
    reactions: Arc<ReactionService>,
}

impl GatewayDispatcher {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        rooms: Arc<RoomService>,
        messages: Arc<MessageService>,
        reactions: Arc<ReactionService>,
    ) -> Self {
        Self {
            registry,
            rooms,
            messages,
            reactions,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// 认证成功后的连接建立：注册并推送房间列表。默认不订阅任何
    /// 房间，订阅需要显式 joinRoom。
    pub async fn handle_connect(
        &self,
        conn_id: ConnectionId,
        user: AuthenticatedUser,
        sender: OutboundSender,
    ) {
        let user_id = user.user_id;
        self.registry.register(conn_id, user, sender).await;
        if let Err(err) = self.push_rooms_list(conn_id, user_id).await {
            self.registry.send_to(conn_id, &scoped_error(&err)).await;
        }
    }

    /// 连接关闭：从注册表和所有房间订阅集合中移除。
    pub async fn handle_disconnect(&self, conn_id: ConnectionId) {
        self.registry.unregister(conn_id).await;
    }

    pub async fn handle_event(&self, conn_id: ConnectionId, event: ClientEvent) {
        let Some(user) = self.registry.user_of(conn_id).await else {
            return;
        };

        let result = match event {
            ClientEvent::JoinRoom { room_id } => self.on_join_room(conn_id, &user, room_id).await,
            ClientEvent::CreateRoom {
                name,
                member_ids,
                history_access,
            } => {
                self.on_create_room(conn_id, &user, name, member_ids, history_access)
                    .await
            }
            ClientEvent::LeaveRoom { room_id } => {
                self.registry.unsubscribe(conn_id, &room_id).await;
                Ok(())
            }
            ClientEvent::SendMessage { room_id, content } => {
                self.on_send_message(&user, room_id, content).await
            }
            ClientEvent::Typing { room_id, is_typing } => {
                self.on_typing(conn_id, &user, room_id, is_typing).await
            }
            ClientEvent::AddReaction {
                message_id,
                emoji,
                room_id,
            } => self.on_add_reaction(&user, message_id, emoji, room_id).await,
            ClientEvent::AddMember {
                room_id,
                username,
                has_history_access,
            } => {
                self.on_add_member(conn_id, room_id, username, has_history_access)
                    .await
            }
            ClientEvent::DeleteRoom { room_id } => self.on_delete_room(&user, room_id).await,
            ClientEvent::ProfileUpdated {} => {
                self.registry
                    .broadcast_all(&ServerEvent::UserUpdated {
                        user_id: user.user_id,
                    })
                    .await;
                Ok(())
            }
        };

        if let Err(err) = result {
            self.registry.send_to(conn_id, &scoped_error(&err)).await;
        }
    }

    async fn on_join_room(
        &self,
        conn_id: ConnectionId,
        user: &AuthenticatedUser,
        room_id: RoomId,
    ) -> Result<(), ApplicationError> {
        self.rooms.join_room(room_id.clone(), user.user_id).await?;
        self.registry.subscribe(conn_id, room_id.clone()).await;

        let messages = self.messages.history(&room_id, user.user_id).await?;
        self.registry
            .send_to(conn_id, &ServerEvent::History { room_id, messages })
            .await;

        self.push_rooms_list(conn_id, user.user_id).await
    }

    async fn on_create_room(
        &self,
        conn_id: ConnectionId,
        user: &AuthenticatedUser,
        name: String,
        member_ids: Vec<UserId>,
        history_access: bool,
    ) -> Result<(), ApplicationError> {
        let room = self
            .rooms
            .create_room(CreateRoomRequest {
                name,
                owner_id: user.user_id,
                member_ids: member_ids.clone(),
                history_access_default: history_access,
            })
            .await?;

        self.registry
            .send_to(conn_id, &ServerEvent::RoomCreated(room))
            .await;

        // 房间集合变化：给创建者和每个被列出的成员刷新房间列表
        self.push_rooms_list_for_user(user.user_id).await?;
        for member_id in member_ids {
            if member_id != user.user_id {
                self.push_rooms_list_for_user(member_id).await?;
            }
        }
        Ok(())
    }

    async fn on_send_message(
        &self,
        user: &AuthenticatedUser,
        room_id: RoomId,
        content: String,
    ) -> Result<(), ApplicationError> {
        let view = self
            .messages
            .append(user.user_id, room_id.clone(), content)
            .await?;
        self.registry
            .broadcast_to_room(&room_id, &ServerEvent::NewMessage(view), None)
            .await;
        Ok(())
    }

    /// 打字状态：无持久化、尽力而为，发给房间里除发送者外的订阅者。
    async fn on_typing(
        &self,
        conn_id: ConnectionId,
        user: &AuthenticatedUser,
        room_id: RoomId,
        is_typing: bool,
    ) -> Result<(), ApplicationError> {
        self.registry
            .broadcast_to_room(
                &room_id,
                &ServerEvent::UserTyping {
                    username: user.username.clone(),
                    is_typing,
                    user_id: user.user_id,
                    room_id: room_id.clone(),
                },
                Some(conn_id),
            )
            .await;
        Ok(())
    }

    async fn on_add_reaction(
        &self,
        user: &AuthenticatedUser,
        message_id: domain::MessageId,
        emoji: String,
        room_id: RoomId,
    ) -> Result<(), ApplicationError> {
        let outcome = self
            .reactions
            .toggle(user.user_id, message_id, &emoji)
            .await?;

        let event = match outcome {
            ReactionToggle::Added(view) => ServerEvent::ReactionAdded(view),
            ReactionToggle::Removed {
                message_id,
                reaction_id,
                user_id,
                emoji,
            } => ServerEvent::ReactionRemoved {
                message_id,
                reaction_id,
                user_id,
                emoji,
            },
        };
        self.registry.broadcast_to_room(&room_id, &event, None).await;
        Ok(())
    }

    async fn on_add_member(
        &self,
        conn_id: ConnectionId,
        room_id: RoomId,
        username: String,
        has_history_access: bool,
    ) -> Result<(), ApplicationError> {
        let added = self
            .rooms
            .add_member(room_id, &username, has_history_access)
            .await?;

        // 面向全部连接的广播是沿用的简化，见 DESIGN.md
        self.registry
            .broadcast_all(&ServerEvent::AddedToRoom {
                room: added.room,
                user_id: added.user.id,
            })
            .await;
        self.registry
            .send_to(conn_id, &ServerEvent::MemberAdded { success: true })
            .await;

        // 新成员的房间集合变了
        self.push_rooms_list_for_user(added.user.id).await
    }

    async fn on_delete_room(
        &self,
        user: &AuthenticatedUser,
        room_id: RoomId,
    ) -> Result<(), ApplicationError> {
        self.rooms.delete_room(&room_id, user.user_id).await?;

        // 先记下受影响的订阅者，广播后强制退订再刷新他们的房间列表
        let affected = self.registry.subscribers_of(&room_id).await;
        self.registry
            .broadcast_to_room(
                &room_id,
                &ServerEvent::RoomDeleted {
                    room_id: room_id.clone(),
                },
                None,
            )
            .await;
        self.registry.unsubscribe_room_all(&room_id).await;

        for (conn_id, user_id) in affected {
            if let Err(err) = self.push_rooms_list(conn_id, user_id).await {
                tracing::warn!(error = %err, connection_id = %conn_id, "rooms list refresh failed");
            }
        }
        Ok(())
    }

    async fn push_rooms_list(
        &self,
        conn_id: ConnectionId,
        user_id: UserId,
    ) -> Result<(), ApplicationError> {
        let rooms = self.rooms.get_user_rooms(user_id).await?;
        self.registry
            .send_to(conn_id, &ServerEvent::RoomsList(rooms))
            .await;
        Ok(())
    }

    async fn push_rooms_list_for_user(&self, user_id: UserId) -> Result<(), ApplicationError> {
        let conns = self.registry.connections_of_user(user_id).await;
        if conns.is_empty() {
            return Ok(());
        }
        let rooms = self.rooms.get_user_rooms(user_id).await?;
        let event = ServerEvent::RoomsList(rooms);
        for conn_id in conns {
            self.registry.send_to(conn_id, &event).await;
        }
        Ok(())
    }
}
