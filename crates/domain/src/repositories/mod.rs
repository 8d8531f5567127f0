//! 存储契约定义
//!
//! 持久化引擎本身是外部协作方，核心只依赖这里的 Repository 接口。
//! 实现方必须提供唯一约束（成员二元组、回应三元组）以及
//! [`RoomRepository::delete_cascade`] 的多语句原子事务。

mod membership_repository;
mod message_repository;
mod reaction_repository;
mod room_repository;
mod user_directory;

pub use membership_repository::MembershipRepository;
pub use message_repository::MessageRepository;
pub use reaction_repository::ReactionRepository;
pub use room_repository::RoomRepository;
pub use user_directory::UserDirectory;
