//! 网关层。
//!
//! 提供 Axum 路由，在 WebSocket 边界完成认证、事件校验和分发，
//! 并通过连接注册表把服务结果路由到正确的连接集合。

mod auth;
mod dispatcher;
mod error;
mod events;
mod registry;
mod routes;
mod state;
mod ws_connection;

pub use auth::{AuthenticatedUser, AuthError, Claims, CredentialVerifier, JwtCredentialVerifier};
pub use dispatcher::GatewayDispatcher;
pub use events::{ClientEvent, ServerEvent};
pub use registry::{ConnectionId, ConnectionRegistry, OutboundFrame, OutboundSender};
pub use routes::router;
pub use state::AppState;
