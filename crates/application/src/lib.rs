//! 应用层实现。
//!
//! 围绕领域模型的用例服务：输入校验、事务边界、以及对外部协作方
//! （用户目录、时钟、存储）的编排。

pub mod clock;
pub mod dto;
pub mod error;
pub mod services;

pub use clock::{Clock, SystemClock};
pub use dto::{MessageView, ReactionView};
pub use error::{ApplicationError, ApplicationResult};
pub use services::{
    AddedMember, CreateRoomRequest, MessageService, MessageServiceDependencies, ReactionService,
    ReactionServiceDependencies, ReactionToggle, RoomService, RoomServiceDependencies,
};
