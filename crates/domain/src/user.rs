use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 用户只读模型。
///
/// 账号的注册、资料维护由外部用户服务负责，核心只读取这份投影，
/// 用于消息作者、回应发起者和成员解析的展示。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub color: String,
}
