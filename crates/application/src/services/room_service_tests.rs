//! 房间服务单元测试
//!
//! 覆盖加入幂等、`general` 惰性创建（含并发）、成员管理和级联删除。

#[cfg(test)]
mod room_service_tests {
    use std::sync::Arc;

    use domain::{DomainError, RoomId, User, UserId};
    use infrastructure::InMemoryStore;
    use uuid::Uuid;

    use crate::clock::SystemClock;
    use crate::error::ApplicationError;
    use crate::services::{CreateRoomRequest, RoomService, RoomServiceDependencies};

    fn service_over(store: &InMemoryStore) -> RoomService {
        let store = Arc::new(store.clone());
        RoomService::new(RoomServiceDependencies {
            room_repository: store.clone(),
            membership_repository: store.clone(),
            user_directory: store,
            clock: Arc::new(SystemClock),
        })
    }

    async fn seed_user(store: &InMemoryStore, username: &str) -> UserId {
        let id = UserId::from(Uuid::new_v4());
        store
            .insert_user(User {
                id,
                username: username.to_owned(),
                color: "#e91e63".to_owned(),
            })
            .await;
        id
    }

    fn assert_domain_err(result: Result<impl std::fmt::Debug, ApplicationError>, expected: DomainError) {
        match result {
            Err(ApplicationError::Domain(err)) => assert_eq!(err, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn join_room_twice_yields_one_membership() {
        let store = InMemoryStore::new();
        let service = service_over(&store);
        let user = seed_user(&store, "alice").await;

        let first = service.join_room(RoomId::general(), user).await.unwrap();
        let second = service.join_room(RoomId::general(), user).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.membership_count(&RoomId::general()).await, 1);
    }

    #[tokio::test]
    async fn first_general_joiner_becomes_owner() {
        let store = InMemoryStore::new();
        let service = service_over(&store);
        let alice = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;

        service.join_room(RoomId::general(), alice).await.unwrap();
        service.join_room(RoomId::general(), bob).await.unwrap();

        let rooms = service.get_user_rooms(bob).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].owner_id, alice);
        assert_eq!(rooms[0].name, "General");
    }

    #[tokio::test]
    async fn concurrent_general_joins_create_exactly_one_room() {
        let store = InMemoryStore::new();
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let service = service_over(&store);
                let user = seed_user(&store, &format!("user{i}")).await;
                service.join_room(RoomId::general(), user).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.membership_count(&RoomId::general()).await, 8);
        let service = service_over(&store);
        let probe = seed_user(&store, "probe").await;
        service.join_room(RoomId::general(), probe).await.unwrap();
        // 所有成员看到的是同一个房间
        let rooms = service.get_user_rooms(probe).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert!(rooms[0].id.is_general());
    }

    #[tokio::test]
    async fn join_unknown_room_fails_not_found() {
        let store = InMemoryStore::new();
        let service = service_over(&store);
        let user = seed_user(&store, "alice").await;

        let result = service.join_room(RoomId::random(), user).await;
        assert_domain_err(result, DomainError::RoomNotFound);
    }

    #[tokio::test]
    async fn create_room_grants_owner_full_history() {
        let store = InMemoryStore::new();
        let service = service_over(&store);
        let owner = seed_user(&store, "alice").await;
        let member = seed_user(&store, "bob").await;

        let room = service
            .create_room(CreateRoomRequest {
                name: "team".to_owned(),
                owner_id: owner,
                member_ids: vec![member, member, owner],
                history_access_default: false,
            })
            .await
            .unwrap();

        let members = service.list_members(&room.id).await.unwrap();
        assert_eq!(members.len(), 2);
        let owner_row = members.iter().find(|m| m.user_id == owner).unwrap();
        let member_row = members.iter().find(|m| m.user_id == member).unwrap();
        assert!(owner_row.has_history_access);
        assert!(!member_row.has_history_access);
    }

    #[tokio::test]
    async fn create_room_rejects_blank_name() {
        let store = InMemoryStore::new();
        let service = service_over(&store);
        let owner = seed_user(&store, "alice").await;

        let result = service
            .create_room(CreateRoomRequest {
                name: "   ".to_owned(),
                owner_id: owner,
                member_ids: Vec::new(),
                history_access_default: true,
            })
            .await;
        assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::InvalidArgument { .. }))
        ));
    }

    #[tokio::test]
    async fn add_member_to_general_is_rejected() {
        let store = InMemoryStore::new();
        let service = service_over(&store);
        let alice = seed_user(&store, "alice").await;
        seed_user(&store, "bob").await;
        service.join_room(RoomId::general(), alice).await.unwrap();

        let result = service.add_member(RoomId::general(), "bob", true).await;
        assert_domain_err(result, DomainError::GeneralRoomImmutable);
    }

    #[tokio::test]
    async fn add_member_resolves_username() {
        let store = InMemoryStore::new();
        let service = service_over(&store);
        let owner = seed_user(&store, "alice").await;
        let bob = seed_user(&store, "bob").await;

        let room = service
            .create_room(CreateRoomRequest {
                name: "team".to_owned(),
                owner_id: owner,
                member_ids: Vec::new(),
                history_access_default: true,
            })
            .await
            .unwrap();

        let added = service.add_member(room.id.clone(), "bob", false).await.unwrap();
        assert_eq!(added.user.id, bob);
        assert_eq!(added.room.id, room.id);
        assert!(!added.membership.has_history_access);

        // 未知用户名
        let result = service.add_member(room.id.clone(), "carol", true).await;
        assert_domain_err(result, DomainError::UserNotFound);

        // 重复添加
        let result = service.add_member(room.id, "bob", true).await;
        assert_domain_err(result, DomainError::MembershipExists);
    }

    #[tokio::test]
    async fn delete_room_is_owner_only() {
        let store = InMemoryStore::new();
        let service = service_over(&store);
        let owner = seed_user(&store, "alice").await;
        let other = seed_user(&store, "bob").await;

        let room = service
            .create_room(CreateRoomRequest {
                name: "team".to_owned(),
                owner_id: owner,
                member_ids: vec![other],
                history_access_default: true,
            })
            .await
            .unwrap();

        let result = service.delete_room(&room.id, other).await;
        assert_domain_err(result, DomainError::NotRoomOwner);

        service.delete_room(&room.id, owner).await.unwrap();
        assert_eq!(service.get_user_rooms(owner).await.unwrap().len(), 0);

        let result = service.delete_room(&room.id, owner).await;
        assert_domain_err(result, DomainError::RoomNotFound);
    }

    #[tokio::test]
    async fn delete_general_is_rejected() {
        let store = InMemoryStore::new();
        let service = service_over(&store);
        let alice = seed_user(&store, "alice").await;
        service.join_room(RoomId::general(), alice).await.unwrap();

        let result = service.delete_room(&RoomId::general(), alice).await;
        assert_domain_err(result, DomainError::GeneralRoomImmutable);
    }
}
