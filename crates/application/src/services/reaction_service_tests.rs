//! 回应服务单元测试
//!
//! 覆盖开关的对合性质、自回应禁止和并发开关的串行化效果。

#[cfg(test)]
mod reaction_service_tests {
    use std::sync::Arc;

    use domain::{DomainError, MessageId, RoomId, User, UserId};
    use infrastructure::InMemoryStore;
    use uuid::Uuid;

    use crate::clock::SystemClock;
    use crate::error::ApplicationError;
    use crate::services::{
        MessageService, MessageServiceDependencies, ReactionService, ReactionServiceDependencies,
        ReactionToggle, RoomService, RoomServiceDependencies,
    };

    struct Fixture {
        store: InMemoryStore,
        reactions: Arc<ReactionService>,
        alice: UserId,
        bob: UserId,
        message_id: MessageId,
    }

    async fn seed_user(store: &InMemoryStore, username: &str) -> UserId {
        let id = UserId::from(Uuid::new_v4());
        store
            .insert_user(User {
                id,
                username: username.to_owned(),
                color: "#009688".to_owned(),
            })
            .await;
        id
    }

    /// alice 在 general 里发一条消息，bob 作为回应者。
    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let shared = Arc::new(store.clone());
        let clock = Arc::new(SystemClock);

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
        let reactions = Arc::new(ReactionService::new(ReactionServiceDependencies {
            message_repository: shared.clone(),
            reaction_repository: shared.clone(),
            user_directory: shared,
            clock,
        }));

        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;
        rooms.join_room(RoomId::general(), alice).await.unwrap();
        rooms.join_room(RoomId::general(), bob).await.unwrap();
        let view = messages
            .append(alice, RoomId::general(), "hello".to_owned())
            .await
            .unwrap();

        Fixture {
            store,
            reactions,
            alice,
            bob,
            message_id: view.id,
        }
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let fx = fixture().await;

        let added = fx.reactions.toggle(fx.bob, fx.message_id, "👍").await.unwrap();
        let reaction_id = match added {
            ReactionToggle::Added(view) => {
                assert_eq!(view.user.username, "bob");
                assert_eq!(view.emoji, "👍");
                view.id
            }
            other => panic!("expected Added, got {other:?}"),
        };
        assert_eq!(fx.store.reaction_snapshot().await.len(), 1);

        let removed = fx.reactions.toggle(fx.bob, fx.message_id, "👍").await.unwrap();
        match removed {
            ReactionToggle::Removed {
                message_id,
                reaction_id: removed_id,
                user_id,
                emoji,
            } => {
                assert_eq!(message_id, fx.message_id);
                assert_eq!(removed_id, reaction_id);
                assert_eq!(user_id, fx.bob);
                assert_eq!(emoji, "👍");
            }
            other => panic!("expected Removed, got {other:?}"),
        }

        // 对合：两次开关之后回到初始状态
        assert!(fx.store.reaction_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn different_emoji_are_independent_keys() {
        let fx = fixture().await;

        fx.reactions.toggle(fx.bob, fx.message_id, "👍").await.unwrap();
        fx.reactions.toggle(fx.bob, fx.message_id, "🎉").await.unwrap();
        assert_eq!(fx.store.reaction_snapshot().await.len(), 2);

        fx.reactions.toggle(fx.bob, fx.message_id, "👍").await.unwrap();
        let remaining = fx.store.reaction_snapshot().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].emoji, "🎉");
    }

    #[tokio::test]
    async fn author_cannot_react_to_own_message() {
        let fx = fixture().await;

        let result = fx.reactions.toggle(fx.alice, fx.message_id, "👍").await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::SelfReaction))
        ));
        assert!(fx.store.reaction_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn toggle_on_missing_message_fails_not_found() {
        let fx = fixture().await;

        let result = fx
            .reactions
            .toggle(fx.bob, MessageId::from(Uuid::new_v4()), "👍")
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::MessageNotFound))
        ));
    }

    /// 两个并发开关等价于某个串行顺序：一加一减，最终回到初始状态。
    #[tokio::test]
    async fn concurrent_toggles_serialize() {
        let fx = fixture().await;

        let first = {
            let reactions = fx.reactions.clone();
            let message_id = fx.message_id;
            let bob = fx.bob;
            tokio::spawn(async move { reactions.toggle(bob, message_id, "👍").await })
        };
        let second = {
            let reactions = fx.reactions.clone();
            let message_id = fx.message_id;
            let bob = fx.bob;
            tokio::spawn(async move { reactions.toggle(bob, message_id, "👍").await })
        };

        let outcomes = [
            first.await.unwrap().unwrap(),
            second.await.unwrap().unwrap(),
        ];

        let added = outcomes
            .iter()
            .filter(|o| matches!(o, ReactionToggle::Added(_)))
            .count();
        let removed = outcomes
            .iter()
            .filter(|o| matches!(o, ReactionToggle::Removed { .. }))
            .count();
        assert_eq!((added, removed), (1, 1));
        assert!(fx.store.reaction_snapshot().await.is_empty());
    }
}
