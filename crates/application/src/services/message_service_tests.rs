//! 消息服务单元测试
//!
//! 覆盖内容校验、历史可见窗口、无成员记录的回退行为和级联删除后的
//! 写入失败。

#[cfg(test)]
mod message_service_tests {
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, TimeZone, Utc};
    use domain::{DomainError, RoomId, Timestamp, User, UserId};
    use infrastructure::InMemoryStore;
    use uuid::Uuid;

    use crate::clock::Clock;
    use crate::error::ApplicationError;
    use crate::services::{
        CreateRoomRequest, MessageService, MessageServiceDependencies, ReactionService,
        ReactionServiceDependencies, RoomService, RoomServiceDependencies,
    };

    /// 每次取值前进一秒的时钟，保证时间戳严格递增且可断言。
    struct StepClock {
        current: Mutex<Timestamp>,
    }

    impl StepClock {
        fn new() -> Self {
            Self {
                current: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> Timestamp {
            let mut guard = self.current.lock().unwrap();
            let now = *guard;
            *guard = now + Duration::seconds(1);
            now
        }
    }

    struct Fixture {
        store: InMemoryStore,
        rooms: RoomService,
        messages: MessageService,
        reactions: ReactionService,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let shared = Arc::new(store.clone());
        let clock: Arc<dyn Clock> = Arc::new(StepClock::new());
        let rooms = RoomService::new(RoomServiceDependencies {
            room_repository: shared.clone(),
            membership_repository: shared.clone(),
            user_directory: shared.clone(),
            clock: clock.clone(),
        });
        let messages = MessageService::new(MessageServiceDependencies {
            room_repository: shared.clone(),
            membership_repository: shared.clone(),
            message_repository: shared.clone(),
            reaction_repository: shared.clone(),
            user_directory: shared.clone(),
            clock: clock.clone(),
        });
        let reactions = ReactionService::new(ReactionServiceDependencies {
            message_repository: shared.clone(),
            reaction_repository: shared.clone(),
            user_directory: shared,
            clock,
        });
        Fixture {
            store,
            rooms,
            messages,
            reactions,
        }
    }

    async fn seed_user(store: &InMemoryStore, username: &str) -> UserId {
        let id = UserId::from(Uuid::new_v4());
        store
            .insert_user(User {
                id,
                username: username.to_owned(),
                color: "#3f51b5".to_owned(),
            })
            .await;
        id
    }

    #[tokio::test]
    async fn append_returns_view_with_author() {
        let fx = fixture();
        let alice = seed_user(&fx.store, "alice").await;
        fx.rooms.join_room(RoomId::general(), alice).await.unwrap();

        let view = fx
            .messages
            .append(alice, RoomId::general(), "hello".to_owned())
            .await
            .unwrap();

        assert_eq!(view.author.username, "alice");
        assert_eq!(view.content, "hello");
        assert!(view.reactions.is_empty());
    }

    #[tokio::test]
    async fn append_validates_content() {
        let fx = fixture();
        let alice = seed_user(&fx.store, "alice").await;
        fx.rooms.join_room(RoomId::general(), alice).await.unwrap();

        let blank = fx
            .messages
            .append(alice, RoomId::general(), "   ".to_owned())
            .await;
        assert!(matches!(
            blank,
            Err(ApplicationError::Domain(DomainError::InvalidArgument { .. }))
        ));

        let long = fx
            .messages
            .append(alice, RoomId::general(), "x".repeat(4001))
            .await;
        assert!(matches!(
            long,
            Err(ApplicationError::Domain(DomainError::InvalidArgument { .. }))
        ));

        assert_eq!(fx.store.message_count(&RoomId::general()).await, 0);
    }

    #[tokio::test]
    async fn append_to_missing_room_fails_not_found() {
        let fx = fixture();
        let alice = seed_user(&fx.store, "alice").await;

        let result = fx
            .messages
            .append(alice, RoomId::random(), "hello".to_owned())
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::RoomNotFound))
        ));
    }

    #[tokio::test]
    async fn history_is_ascending_by_creation_time() {
        let fx = fixture();
        let alice = seed_user(&fx.store, "alice").await;
        fx.rooms.join_room(RoomId::general(), alice).await.unwrap();

        for text in ["one", "two", "three"] {
            fx.messages
                .append(alice, RoomId::general(), text.to_owned())
                .await
                .unwrap();
        }

        let history = fx.messages.history(&RoomId::general(), alice).await.unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["one", "two", "three"]);
        assert!(history.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    /// 限制历史访问的成员只能看到自己加入之后的消息。
    #[tokio::test]
    async fn restricted_member_sees_only_messages_after_join() {
        let fx = fixture();
        let alice = seed_user(&fx.store, "alice").await;
        seed_user(&fx.store, "bob").await;

        let room = fx
            .rooms
            .create_room(CreateRoomRequest {
                name: "team".to_owned(),
                owner_id: alice,
                member_ids: Vec::new(),
                history_access_default: false,
            })
            .await
            .unwrap();

        // t1: bob 尚未加入
        fx.messages
            .append(alice, room.id.clone(), "hi".to_owned())
            .await
            .unwrap();

        // t2: bob 加入，无历史访问权
        let added = fx.rooms.add_member(room.id.clone(), "bob", false).await.unwrap();
        let bob = added.user.id;

        let history = fx.messages.history(&room.id, bob).await.unwrap();
        assert!(history.is_empty());

        // t3: 加入之后的消息可见
        fx.messages
            .append(alice, room.id.clone(), "hello".to_owned())
            .await
            .unwrap();

        let history = fx.messages.history(&room.id, bob).await.unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["hello"]);

        // 房主看到完整历史
        let full = fx.messages.history(&room.id, alice).await.unwrap();
        assert_eq!(full.len(), 2);
    }

    /// 没有成员记录的请求者回退到完整历史（刻意保留的行为）。
    #[tokio::test]
    async fn requester_without_membership_gets_full_history() {
        let fx = fixture();
        let alice = seed_user(&fx.store, "alice").await;
        let stranger = seed_user(&fx.store, "mallory").await;
        fx.rooms.join_room(RoomId::general(), alice).await.unwrap();
        fx.messages
            .append(alice, RoomId::general(), "hello".to_owned())
            .await
            .unwrap();

        let history = fx.messages.history(&RoomId::general(), stranger).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn history_embeds_reactions_with_users() {
        let fx = fixture();
        let alice = seed_user(&fx.store, "alice").await;
        let bob = seed_user(&fx.store, "bob").await;
        fx.rooms.join_room(RoomId::general(), alice).await.unwrap();
        fx.rooms.join_room(RoomId::general(), bob).await.unwrap();

        let message = fx
            .messages
            .append(alice, RoomId::general(), "hello".to_owned())
            .await
            .unwrap();
        fx.reactions.toggle(bob, message.id, "👍").await.unwrap();

        let history = fx.messages.history(&RoomId::general(), alice).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reactions.len(), 1);
        assert_eq!(history[0].reactions[0].user.username, "bob");
        assert_eq!(history[0].reactions[0].emoji, "👍");
    }

    /// 级联删除之后：没有任何记录引用该房间，后续写入失败 NotFound。
    #[tokio::test]
    async fn cascade_delete_leaves_nothing_behind() {
        let fx = fixture();
        let alice = seed_user(&fx.store, "alice").await;
        let bob = seed_user(&fx.store, "bob").await;

        let room = fx
            .rooms
            .create_room(CreateRoomRequest {
                name: "doomed".to_owned(),
                owner_id: alice,
                member_ids: vec![bob],
                history_access_default: true,
            })
            .await
            .unwrap();

        let message = fx
            .messages
            .append(alice, room.id.clone(), "hello".to_owned())
            .await
            .unwrap();
        fx.reactions.toggle(bob, message.id, "🔥").await.unwrap();

        fx.rooms.delete_room(&room.id, alice).await.unwrap();

        assert_eq!(fx.store.message_count(&room.id).await, 0);
        assert_eq!(fx.store.membership_count(&room.id).await, 0);
        assert!(fx.store.reaction_snapshot().await.is_empty());

        let result = fx
            .messages
            .append(alice, room.id.clone(), "too late".to_owned())
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::RoomNotFound))
        ));
    }
}
