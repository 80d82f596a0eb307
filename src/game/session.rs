//! Session management - slot assignment, control schemes, input buffers

use std::collections::HashMap;

use uuid::Uuid;

use crate::ws::protocol::{ControlScheme, Role};

/// Logical control state for one tick, translated from physical keys
/// through the session's control scheme. Last write wins; the scheduler
/// reads whatever is current at tick time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
    pub block: bool,
    pub special: bool,
}

impl InputFrame {
    /// Translate a physical-key report into logical controls
    pub fn from_keys(keys: &HashMap<String, bool>, scheme: &ControlScheme) -> Self {
        let held = |key: &str| keys.get(key).copied().unwrap_or(false);
        Self {
            left: held(scheme.left),
            right: held(scheme.right),
            jump: held(scheme.jump),
            attack: held(scheme.attack),
            block: held(scheme.block),
            special: held(scheme.special),
        }
    }

    /// Consume momentary controls after an edge-triggered session's tick.
    /// Movement keys stay held; presses are one-shot.
    pub fn clear_momentary(&mut self) {
        self.jump = false;
        self.attack = false;
        self.block = false;
        self.special = false;
    }
}

/// One connection's session state
#[derive(Debug, Clone)]
pub struct Session {
    pub conn_id: Uuid,
    pub role: Role,
    pub input: InputFrame,
    /// Edge-triggered (touch-style) input mode
    pub mobile: bool,
}

/// All sessions, keyed by connection. Owned by the room actor; the two
/// player slots are first come, first served.
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: HashMap<Uuid, Session>,
    player1: Option<Uuid>,
    player2: Option<Uuid>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection: fill player1, then player2, else spectator.
    /// The assignment is fixed for the connection's lifetime.
    pub fn connect(&mut self, conn_id: Uuid) -> Role {
        let role = if self.player1.is_none() {
            self.player1 = Some(conn_id);
            Role::Player1
        } else if self.player2.is_none() {
            self.player2 = Some(conn_id);
            Role::Player2
        } else {
            Role::Spectator
        };

        self.sessions.insert(
            conn_id,
            Session {
                conn_id,
                role,
                input: InputFrame::default(),
                mobile: false,
            },
        );

        role
    }

    /// Remove a connection, freeing its slot (and input buffer) for the
    /// next connection. Returns the role it held.
    pub fn disconnect(&mut self, conn_id: Uuid) -> Option<Role> {
        let session = self.sessions.remove(&conn_id)?;
        match session.role {
            Role::Player1 => self.player1 = None,
            Role::Player2 => self.player2 = None,
            Role::Spectator => {}
        }
        Some(session.role)
    }

    /// Store the latest input report for a connection. Spectator input is
    /// ignored. Returns false when the report was dropped.
    pub fn store_input(
        &mut self,
        conn_id: Uuid,
        keys: &HashMap<String, bool>,
        is_mobile: bool,
    ) -> bool {
        let Some(session) = self.sessions.get_mut(&conn_id) else {
            return false;
        };
        let scheme = match session.role {
            Role::Player1 => ControlScheme::player1(),
            Role::Player2 => ControlScheme::player2(),
            Role::Spectator => return false,
        };
        session.input = InputFrame::from_keys(keys, &scheme);
        session.mobile = is_mobile;
        true
    }

    pub fn role_of(&self, conn_id: Uuid) -> Option<Role> {
        self.sessions.get(&conn_id).map(|s| s.role)
    }

    /// Snapshot a player slot's input for this tick. Edge-triggered
    /// sessions have their momentary keys consumed in the stored buffer.
    pub fn take_frame(&mut self, role: Role) -> InputFrame {
        let conn_id = match role {
            Role::Player1 => self.player1,
            Role::Player2 => self.player2,
            Role::Spectator => None,
        };
        let Some(session) = conn_id.and_then(|id| self.sessions.get_mut(&id)) else {
            return InputFrame::default();
        };
        let frame = session.input;
        if session.mobile {
            session.input.clear_momentary();
        }
        frame
    }

    pub fn player1_connected(&self) -> bool {
        self.player1.is_some()
    }

    pub fn player2_connected(&self) -> bool {
        self.player2.is_some()
    }

    /// Occupied player slots (0..=2), the "total" of playersUpdate
    pub fn player_count(&self) -> u32 {
        self.player1.is_some() as u32 + self.player2.is_some() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pressed: &[&str]) -> HashMap<String, bool> {
        pressed.iter().map(|k| (k.to_string(), true)).collect()
    }

    #[test]
    fn slots_fill_first_come_first_served() {
        let mut table = SessionTable::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        assert_eq!(table.connect(a), Role::Player1);
        assert_eq!(table.connect(b), Role::Player2);
        assert_eq!(table.connect(c), Role::Spectator);
        assert_eq!(table.player_count(), 2);
    }

    #[test]
    fn freed_slot_goes_to_the_next_connection() {
        let mut table = SessionTable::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        table.connect(a);
        table.connect(b);

        assert_eq!(table.disconnect(a), Some(Role::Player1));
        assert!(!table.player1_connected());

        let c = Uuid::new_v4();
        assert_eq!(table.connect(c), Role::Player1);
    }

    #[test]
    fn input_translates_through_the_slot_scheme() {
        let mut table = SessionTable::new();
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        table.connect(p1);
        table.connect(p2);

        assert!(table.store_input(p1, &keys(&["a", "f"]), false));
        assert!(table.store_input(p2, &keys(&["arrowright", "2"]), false));

        let f1 = table.take_frame(Role::Player1);
        assert!(f1.left && f1.attack && !f1.right);

        let f2 = table.take_frame(Role::Player2);
        assert!(f2.right && f2.block && !f2.left);
    }

    #[test]
    fn spectator_input_is_dropped() {
        let mut table = SessionTable::new();
        table.connect(Uuid::new_v4());
        table.connect(Uuid::new_v4());
        let spec = Uuid::new_v4();
        table.connect(spec);

        assert!(!table.store_input(spec, &keys(&["a"]), false));
    }

    #[test]
    fn edge_triggered_keys_are_consumed_once() {
        let mut table = SessionTable::new();
        let p1 = Uuid::new_v4();
        table.connect(p1);
        table.store_input(p1, &keys(&["a", "f", "g"]), true);

        let first = table.take_frame(Role::Player1);
        assert!(first.attack && first.block && first.left);

        let second = table.take_frame(Role::Player1);
        assert!(!second.attack && !second.block);
        // movement stays held
        assert!(second.left);
    }

    #[test]
    fn continuous_keys_stay_held() {
        let mut table = SessionTable::new();
        let p1 = Uuid::new_v4();
        table.connect(p1);
        table.store_input(p1, &keys(&["g"]), false);

        assert!(table.take_frame(Role::Player1).block);
        assert!(table.take_frame(Role::Player1).block);
    }

    #[test]
    fn vacant_slot_yields_neutral_input() {
        let mut table = SessionTable::new();
        assert_eq!(table.take_frame(Role::Player1), InputFrame::default());
    }
}
