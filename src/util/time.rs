//! Time utilities for game simulation

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Simulation tick period (~60 Hz)
pub const TICK_MILLIS: u64 = 16;
/// Round countdown period
pub const TIMER_MILLIS: u64 = 1000;

/// Recovery delay after a normal attack
pub const NORMAL_RECOVERY_MILLIS: u64 = 200;
/// Recovery delay after a special attack
pub const SPECIAL_RECOVERY_MILLIS: u64 = 400;

/// Attack-inactivity window after which a combo decays to zero
pub const COMBO_DECAY_MILLIS: u64 = 2000;
