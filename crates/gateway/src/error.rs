use application::ApplicationError;

use crate::events::ServerEvent;

/// 把服务错误降级为只发给发起连接的 error 事件。
///
/// 领域错误的文案可以原样转发；存储错误不向客户端透露细节。
pub(crate) fn scoped_error(err: &ApplicationError) -> ServerEvent {
    let message = match err {
        ApplicationError::Domain(domain_err) => domain_err.to_string(),
        ApplicationError::Repository(repo_err) => {
            tracing::error!(error = %repo_err, "repository failure");
            "internal error".to_owned()
        }
    };
    ServerEvent::Error { message }
}

/// 帧解析失败时的统一回应。
pub(crate) fn invalid_payload_error() -> ServerEvent {
    ServerEvent::Error {
        message: "invalid event payload".to_owned(),
    }
}
