mod message_service;
mod reaction_service;
mod room_service;

#[cfg(test)]
mod message_service_tests;
#[cfg(test)]
mod reaction_service_tests;
#[cfg(test)]
mod room_service_tests;

pub use message_service::{MessageService, MessageServiceDependencies};
pub use reaction_service::{ReactionService, ReactionServiceDependencies, ReactionToggle};
pub use room_service::{
    AddedMember, CreateRoomRequest, RoomService, RoomServiceDependencies,
};
