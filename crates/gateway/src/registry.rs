//! 连接注册表
//!
//! 网关显式持有的连接状态：连接 → 身份与出站通道，房间 → 订阅连接
//! 集合，用户 → 连接集合。所有操作幂等；注销时连接从每个房间的
//! 订阅集合中移除。出站投递也在这里完成，单个连接的故障不影响
//! 其他连接。

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use domain::{RoomId, UserId};

use crate::auth::AuthenticatedUser;
use crate::events::ServerEvent;

/// 连接唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 发往单个连接的出站帧。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// 序列化好的 [`ServerEvent`]。
    Text(String),
    Pong(Vec<u8>),
}

pub type OutboundSender = mpsc::UnboundedSender<OutboundFrame>;

struct ConnectionEntry {
    user: AuthenticatedUser,
    sender: OutboundSender,
    rooms: HashSet<RoomId>,
}

#[derive(Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
    users: HashMap<UserId, HashSet<ConnectionId>>,
}

impl RegistryInner {
    fn deliver(&self, conn_id: ConnectionId, frame: OutboundFrame) {
        if let Some(entry) = self.connections.get(&conn_id) {
            // 接收端已关闭说明连接正在清理，丢帧即可
            if entry.sender.send(frame).is_err() {
                tracing::debug!(connection_id = %conn_id, "dropping frame for closing connection");
            }
        }
    }
}

#[derive(Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(
        &self,
        conn_id: ConnectionId,
        user: AuthenticatedUser,
        sender: OutboundSender,
    ) {
        let mut inner = self.inner.write().await;
        inner.users.entry(user.user_id).or_default().insert(conn_id);
        inner.connections.insert(
            conn_id,
            ConnectionEntry {
                user,
                sender,
                rooms: HashSet::new(),
            },
        );
        tracing::info!(connection_id = %conn_id, "connection registered");
    }

    /// 注销连接并退出其订阅的全部房间。
    pub async fn unregister(&self, conn_id: ConnectionId) {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.connections.remove(&conn_id) else {
            return;
        };
        for room_id in &entry.rooms {
            if let Some(subscribers) = inner.rooms.get_mut(room_id) {
                subscribers.remove(&conn_id);
                if subscribers.is_empty() {
                    inner.rooms.remove(room_id);
                }
            }
        }
        if let Some(conns) = inner.users.get_mut(&entry.user.user_id) {
            conns.remove(&conn_id);
            if conns.is_empty() {
                inner.users.remove(&entry.user.user_id);
            }
        }
        tracing::info!(connection_id = %conn_id, user_id = %entry.user.user_id, "connection unregistered");
    }

    pub async fn subscribe(&self, conn_id: ConnectionId, room_id: RoomId) {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.connections.get_mut(&conn_id) else {
            return;
        };
        entry.rooms.insert(room_id.clone());
        inner.rooms.entry(room_id).or_default().insert(conn_id);
    }

    pub async fn unsubscribe(&self, conn_id: ConnectionId, room_id: &RoomId) {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.connections.get_mut(&conn_id) {
            entry.rooms.remove(room_id);
        }
        if let Some(subscribers) = inner.rooms.get_mut(room_id) {
            subscribers.remove(&conn_id);
            if subscribers.is_empty() {
                inner.rooms.remove(room_id);
            }
        }
    }

    /// 强制清空房间的订阅集合（房间删除后使用）。
    pub async fn unsubscribe_room_all(&self, room_id: &RoomId) {
        let mut inner = self.inner.write().await;
        let Some(subscribers) = inner.rooms.remove(room_id) else {
            return;
        };
        for conn_id in subscribers {
            if let Some(entry) = inner.connections.get_mut(&conn_id) {
                entry.rooms.remove(room_id);
            }
        }
    }

    pub async fn user_of(&self, conn_id: ConnectionId) -> Option<AuthenticatedUser> {
        self.inner
            .read()
            .await
            .connections
            .get(&conn_id)
            .map(|entry| entry.user.clone())
    }

    /// 房间当前的订阅者，连同各自的用户身份。
    pub async fn subscribers_of(&self, room_id: &RoomId) -> Vec<(ConnectionId, UserId)> {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(room_id)
            .map(|subscribers| {
                subscribers
                    .iter()
                    .filter_map(|conn_id| {
                        inner
                            .connections
                            .get(conn_id)
                            .map(|entry| (*conn_id, entry.user.user_id))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn connections_of_user(&self, user_id: UserId) -> Vec<ConnectionId> {
        self.inner
            .read()
            .await
            .users
            .get(&user_id)
            .map(|conns| conns.iter().copied().collect())
            .unwrap_or_default()
    }

    pub async fn send_to(&self, conn_id: ConnectionId, event: &ServerEvent) {
        let Some(payload) = serialize(event) else {
            return;
        };
        self.inner
            .read()
            .await
            .deliver(conn_id, OutboundFrame::Text(payload));
    }

    pub async fn send_pong(&self, conn_id: ConnectionId, data: Vec<u8>) {
        self.inner
            .read()
            .await
            .deliver(conn_id, OutboundFrame::Pong(data));
    }

    /// 向房间的订阅者广播，`except` 给定时跳过该连接（typing 场景）。
    pub async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        event: &ServerEvent,
        except: Option<ConnectionId>,
    ) {
        let Some(payload) = serialize(event) else {
            return;
        };
        let inner = self.inner.read().await;
        let Some(subscribers) = inner.rooms.get(room_id) else {
            return;
        };
        for conn_id in subscribers {
            if Some(*conn_id) == except {
                continue;
            }
            inner.deliver(*conn_id, OutboundFrame::Text(payload.clone()));
        }
    }

    pub async fn broadcast_all(&self, event: &ServerEvent) {
        let Some(payload) = serialize(event) else {
            return;
        };
        let inner = self.inner.read().await;
        for conn_id in inner.connections.keys() {
            inner.deliver(*conn_id, OutboundFrame::Text(payload.clone()));
        }
    }
}

fn serialize(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(payload) => Some(payload),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize server event");
            None
        }
    }
}
