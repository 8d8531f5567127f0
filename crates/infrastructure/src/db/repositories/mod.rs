//! PostgreSQL Repository 实现

mod membership_repository_impl;
mod message_repository_impl;
mod reaction_repository_impl;
mod room_repository_impl;
mod user_directory_impl;

pub use membership_repository_impl::PgMembershipRepository;
pub use message_repository_impl::PgMessageRepository;
pub use reaction_repository_impl::PgReactionRepository;
pub use room_repository_impl::PgRoomRepository;
pub use user_directory_impl::PgUserDirectory;
