//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//!
//! Field and tag casing mirrors the event names the browser client already
//! speaks (`playerAction`, `gameStateUpdate`, ...), so legacy clients keep
//! working against this server.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Slot a connection may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player1,
    Player2,
    Spectator,
}

/// Round winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player1,
    Player2,
    Draw,
}

/// Which direction a fighter faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    Right,
}

/// Physical-key control scheme for an assigned slot
#[derive(Debug, Clone, Serialize)]
pub struct ControlScheme {
    pub left: &'static str,
    pub right: &'static str,
    pub jump: &'static str,
    pub attack: &'static str,
    pub block: &'static str,
    pub special: &'static str,
}

impl ControlScheme {
    /// Keyboard layout for the left-side fighter
    pub const fn player1() -> Self {
        Self {
            left: "a",
            right: "d",
            jump: "w",
            attack: "f",
            block: "g",
            special: "h",
        }
    }

    /// Keyboard layout for the right-side fighter
    pub const fn player2() -> Self {
        Self {
            left: "arrowleft",
            right: "arrowright",
            jump: "arrowup",
            attack: "1",
            block: "2",
            special: "3",
        }
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Latest control-key state for the sending connection
    #[serde(rename_all = "camelCase")]
    PlayerAction {
        /// Physical key name -> held, in the sender's control scheme
        keys: HashMap<String, bool>,
        /// Touch-style client: momentary keys are consumed once per press
        #[serde(default)]
        is_mobile: bool,
    },

    /// Request a round start (players only)
    StartGame,
}

/// Messages sent from server to client. Serialize-only: the control
/// scheme descriptors are static strings.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Slot assignment, sent once per connection
    AssignPlayer {
        role: Role,
        #[serde(skip_serializing_if = "Option::is_none")]
        controls: Option<ControlScheme>,
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<&'static str>,
    },

    /// Occupancy summary, sent whenever slot occupancy changes
    #[serde(rename_all = "camelCase")]
    PlayersUpdate {
        player1_connected: bool,
        player2_connected: bool,
        total: u32,
        game_status: GameStatus,
    },

    /// Full world state, sent on every state-affecting event
    GameStateUpdate(WorldSnapshot),
}

/// Coarse round status reported alongside occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Running,
}

/// One fighter's state on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FighterSnapshot {
    pub x: f32,
    pub y: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub facing: Facing,
    pub is_attacking: bool,
    pub is_blocking: bool,
    pub is_jumping: bool,
    pub jump_velocity: f32,
    pub combo: u32,
    pub special: f32,
    pub last_attack_time: u64,
}

/// Full world state on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    pub player1: FighterSnapshot,
    pub player2: FighterSnapshot,
    pub game_started: bool,
    pub winner: Option<Winner>,
    pub round: u32,
    pub timer: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_action_parses_legacy_shape() {
        let raw = r#"{"type":"playerAction","keys":{"a":true,"f":false}}"#;
        let msg: ClientMsg = serde_json::from_str(raw).unwrap();
        match msg {
            ClientMsg::PlayerAction { keys, is_mobile } => {
                assert_eq!(keys.get("a"), Some(&true));
                assert_eq!(keys.get("f"), Some(&false));
                assert!(!is_mobile);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn start_game_has_no_payload() {
        let msg: ClientMsg = serde_json::from_str(r#"{"type":"startGame"}"#).unwrap();
        assert!(matches!(msg, ClientMsg::StartGame));
    }

    #[test]
    fn game_state_update_inlines_snapshot_fields_with_the_tag() {
        let fighter = FighterSnapshot {
            x: 100.0,
            y: 300.0,
            hp: 100.0,
            max_hp: 100.0,
            facing: Facing::Right,
            is_attacking: false,
            is_blocking: false,
            is_jumping: false,
            jump_velocity: 0.0,
            combo: 0,
            special: 100.0,
            last_attack_time: 0,
        };
        let msg = ServerMsg::GameStateUpdate(WorldSnapshot {
            player1: fighter.clone(),
            player2: fighter,
            game_started: true,
            winner: None,
            round: 1,
            timer: 90,
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "gameStateUpdate");
        assert_eq!(json["player1"]["maxHp"], 100.0);
        assert_eq!(json["gameStarted"], true);
        assert_eq!(json["timer"], 90);
    }

    #[test]
    fn assign_player_omits_controls_for_spectators() {
        let msg = ServerMsg::AssignPlayer {
            role: Role::Spectator,
            controls: None,
            position: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"assignPlayer","role":"spectator"}"#);
    }
}
