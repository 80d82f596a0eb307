//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::RoomHandle;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub room: RoomHandle,
}

impl AppState {
    pub fn new(config: Config, room: RoomHandle) -> Self {
        Self {
            config: Arc::new(config),
            room,
        }
    }
}
