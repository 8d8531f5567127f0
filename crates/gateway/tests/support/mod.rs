//! 测试支撑：内存存储上的完整网关装配，不经过真实网络。

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use application::{
    MessageService, MessageServiceDependencies, ReactionService, ReactionServiceDependencies,
    RoomService, RoomServiceDependencies, SystemClock,
};
use domain::{User, UserId};
use gateway::{
    AuthenticatedUser, ConnectionId, ConnectionRegistry, GatewayDispatcher, OutboundFrame,
    ServerEvent,
};
use infrastructure::InMemoryStore;

pub struct TestHarness {
    pub store: InMemoryStore,
    pub dispatcher: Arc<GatewayDispatcher>,
}

pub fn harness() -> TestHarness {
    let store = InMemoryStore::new();
    let shared = Arc::new(store.clone());
    let clock: Arc<dyn application::Clock> = Arc::new(SystemClock);

    let rooms = Arc::new(RoomService::new(RoomServiceDependencies {
        room_repository: shared.clone(),
        membership_repository: shared.clone(),
        user_directory: shared.clone(),
        clock: clock.clone(),
    }));
    let messages = Arc::new(MessageService::new(MessageServiceDependencies {
        room_repository: shared.clone(),
        membership_repository: shared.clone(),
        message_repository: shared.clone(),
        reaction_repository: shared.clone(),
        user_directory: shared.clone(),
        clock: clock.clone(),
    }));
    let reactions = Arc::new(ReactionService::new(ReactionServiceDependencies {
        message_repository: shared.clone(),
        reaction_repository: shared.clone(),
        user_directory: shared,
        clock,
    }));

    let dispatcher = Arc::new(GatewayDispatcher::new(
        Arc::new(ConnectionRegistry::new()),
        rooms,
        messages,
        reactions,
    ));

    TestHarness { store, dispatcher }
}

pub async fn seed_user(store: &InMemoryStore, username: &str) -> AuthenticatedUser {
    let id = UserId::from(Uuid::new_v4());
    store
        .insert_user(User {
            id,
            username: username.to_owned(),
            color: "#673ab7".to_owned(),
        })
        .await;
    AuthenticatedUser {
        user_id: id,
        username: username.to_owned(),
    }
}

/// 模拟一次认证完成的连接建立，返回连接 ID 和出站帧接收端。
pub async fn connect(
    harness: &TestHarness,
    user: &AuthenticatedUser,
) -> (ConnectionId, mpsc::UnboundedReceiver<OutboundFrame>) {
    let conn_id = ConnectionId::random();
    let (tx, rx) = mpsc::unbounded_channel();
    harness
        .dispatcher
        .handle_connect(conn_id, user.clone(), tx)
        .await;
    (conn_id, rx)
}

/// 取走并解析当前积压的全部出站事件。
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<OutboundFrame>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        match frame {
            OutboundFrame::Text(payload) => {
                events.push(serde_json::from_str(&payload).expect("valid server event"))
            }
            OutboundFrame::Pong(_) => {}
        }
    }
    events
}

pub fn expect_event<F>(events: &[ServerEvent], predicate: F) -> &ServerEvent
where
    F: Fn(&ServerEvent) -> bool,
{
    events
        .iter()
        .find(|event| predicate(event))
        .unwrap_or_else(|| panic!("expected event not found in {events:?}"))
}
