//! 主应用程序入口
//!
//! 装配存储、用例服务和网关，启动 Axum 服务。

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use application::{
    MessageService, MessageServiceDependencies, ReactionService, ReactionServiceDependencies,
    RoomService, RoomServiceDependencies, SystemClock,
};
use config::AppConfig;
use gateway::{router, AppState, ConnectionRegistry, GatewayDispatcher, JwtCredentialVerifier};
use infrastructure::{
    create_pg_pool, PgMembershipRepository, PgMessageRepository, PgReactionRepository,
    PgRoomRepository, PgUserDirectory,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env_with_defaults();

    tracing::info!(
        "connecting database: {}",
        config.database.url.split('@').next_back().unwrap_or("unknown")
    );
    let pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;

    // 运行迁移
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let room_repository = Arc::new(PgRoomRepository::new(pool.clone()));
    let membership_repository = Arc::new(PgMembershipRepository::new(pool.clone()));
    let message_repository = Arc::new(PgMessageRepository::new(pool.clone()));
    let reaction_repository = Arc::new(PgReactionRepository::new(pool.clone()));
    let user_directory = Arc::new(PgUserDirectory::new(pool));

    let clock: Arc<dyn application::Clock> = Arc::new(SystemClock);

    let rooms = Arc::new(RoomService::new(RoomServiceDependencies {
        room_repository: room_repository.clone(),
        membership_repository: membership_repository.clone(),
        user_directory: user_directory.clone(),
        clock: clock.clone(),
    }));
    let messages = Arc::new(MessageService::new(MessageServiceDependencies {
        room_repository,
        membership_repository,
        message_repository: message_repository.clone(),
        reaction_repository: reaction_repository.clone(),
        user_directory: user_directory.clone(),
        clock: clock.clone(),
    }));
    let reactions = Arc::new(ReactionService::new(ReactionServiceDependencies {
        message_repository,
        reaction_repository,
        user_directory,
        clock,
    }));

    let dispatcher = Arc::new(GatewayDispatcher::new(
        Arc::new(ConnectionRegistry::new()),
        rooms,
        messages,
        reactions,
    ));
    let verifier = Arc::new(JwtCredentialVerifier::new(config.jwt.clone()));

    let state = AppState::new(dispatcher, verifier);
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("chat gateway listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
