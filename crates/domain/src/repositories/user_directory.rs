//! 用户目录接口定义
//!
//! 用户资料由外部服务维护，核心只做只读解析。

use async_trait::async_trait;

use crate::errors::RepositoryResult;
use crate::user::User;
use crate::value_objects::UserId;

/// 用户目录接口
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
}
