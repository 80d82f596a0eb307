//! Game simulation modules

pub mod broadcast;
pub mod combat;
pub mod physics;
pub mod room;
pub mod session;
pub mod world;

pub use room::{GameRoom, RoomEvent, RoomHandle};
