//! World state: the two fighters and the round/timer state machine

use tokio::time::Instant;

use crate::ws::protocol::{Facing, FighterSnapshot, Winner, WorldSnapshot};

/// Maximum hit points
pub const MAX_HP: f32 = 100.0;
/// Special meter cap
pub const MAX_SPECIAL: f32 = 100.0;
/// Special meter regeneration per tick
pub const SPECIAL_REGEN: f32 = 0.5;
/// Round length in seconds
pub const ROUND_SECONDS: u32 = 90;

/// Spawn positions
pub const P1_SPAWN_X: f32 = 100.0;
pub const P2_SPAWN_X: f32 = 600.0;

/// One of the two player slots in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    /// The winner awarded when this side's fighter is knocked out
    pub fn opponent_wins(self) -> Winner {
        match self {
            Side::Player1 => Winner::Player2,
            Side::Player2 => Winner::Player1,
        }
    }
}

/// One fighter's authoritative state
#[derive(Debug, Clone)]
pub struct Fighter {
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
    /// Unix millis of the most recent attack initiation (combo decay)
    pub last_attack_ms: u64,

    /// Pending attack-recovery deadline. At most one: `is_attacking`
    /// gates new attacks until it fires. Not part of the wire state.
    pub recover_at: Option<Instant>,
}

impl Fighter {
    pub fn spawn(x: f32, facing: Facing) -> Self {
        Self {
            x,
            y: super::physics::GROUND_Y,
            hp: MAX_HP,
            max_hp: MAX_HP,
            facing,
            is_attacking: false,
            is_blocking: false,
            is_jumping: false,
            jump_velocity: 0.0,
            combo: 0,
            special: MAX_SPECIAL,
            last_attack_ms: 0,
            recover_at: None,
        }
    }

    pub fn snapshot(&self) -> FighterSnapshot {
        FighterSnapshot {
            x: self.x,
            y: self.y,
            hp: self.hp,
            max_hp: self.max_hp,
            facing: self.facing,
            is_attacking: self.is_attacking,
            is_blocking: self.is_blocking,
            is_jumping: self.is_jumping,
            jump_velocity: self.jump_velocity,
            combo: self.combo,
            special: self.special,
            last_attack_time: self.last_attack_ms,
        }
    }
}

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// No round active (boot, or a player disconnected mid-round)
    Idle,
    /// Tick and timer both live
    Running,
    /// Winner decided, world frozen until the next start
    Ended,
}

/// The single shared world, owned exclusively by the room actor
#[derive(Debug, Clone)]
pub struct WorldState {
    pub player1: Fighter,
    pub player2: Fighter,
    pub phase: RoundPhase,
    pub winner: Option<Winner>,
    pub round: u32,
    pub timer: u32,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            player1: Fighter::spawn(P1_SPAWN_X, Facing::Right),
            player2: Fighter::spawn(P2_SPAWN_X, Facing::Left),
            phase: RoundPhase::Idle,
            winner: None,
            round: 1,
            timer: ROUND_SECONDS,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    /// A round may start from Idle or Ended, never while Running
    pub fn can_start(&self) -> bool {
        self.phase != RoundPhase::Running
    }

    /// Reset to fresh fighters and begin a round. Replacing the fighters
    /// drops any pending recovery deadlines from the previous round.
    pub fn start_round(&mut self) {
        if self.phase == RoundPhase::Ended {
            self.round += 1;
        }
        self.player1 = Fighter::spawn(P1_SPAWN_X, Facing::Right);
        self.player2 = Fighter::spawn(P2_SPAWN_X, Facing::Left);
        self.winner = None;
        self.timer = ROUND_SECONDS;
        self.phase = RoundPhase::Running;
    }

    /// Force the round inactive (player disconnect). Pending recoveries
    /// are cancelled so a late deadline cannot mutate the frozen world.
    pub fn pause(&mut self) {
        self.phase = RoundPhase::Idle;
        self.player1.recover_at = None;
        self.player2.recover_at = None;
    }

    /// Split borrow of (this side's fighter, the opponent)
    pub fn pair_mut(&mut self, side: Side) -> (&mut Fighter, &mut Fighter) {
        match side {
            Side::Player1 => (&mut self.player1, &mut self.player2),
            Side::Player2 => (&mut self.player2, &mut self.player1),
        }
    }

    /// Knockout check, run once per tick after both fighters are
    /// processed. Player1's death is evaluated first: simultaneous zero
    /// HP is a fixed tie-break in player2's favor, not arbitration.
    pub fn resolve_knockout(&mut self) {
        if !self.is_running() {
            return;
        }
        let downed = if self.player1.hp <= 0.0 {
            Side::Player1
        } else if self.player2.hp <= 0.0 {
            Side::Player2
        } else {
            return;
        };
        self.winner = Some(downed.opponent_wins());
        self.phase = RoundPhase::Ended;
    }

    /// Timeout outcome: higher HP wins, equal HP is a draw
    pub fn resolve_timeout(&mut self) {
        self.winner = Some(if self.player1.hp > self.player2.hp {
            Winner::Player1
        } else if self.player2.hp > self.player1.hp {
            Winner::Player2
        } else {
            Winner::Draw
        });
        self.timer = 0;
        self.phase = RoundPhase::Ended;
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            player1: self.player1.snapshot(),
            player2: self.player2.snapshot(),
            game_started: self.phase != RoundPhase::Idle,
            winner: self.winner,
            round: self.round,
            timer: self.timer,
        }
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_round_resets_fighters_and_timer() {
        let mut world = WorldState::new();
        world.player1.hp = 12.0;
        world.player2.special = 3.0;
        world.timer = 4;

        world.start_round();

        assert!(world.is_running());
        assert_eq!(world.player1.hp, MAX_HP);
        assert_eq!(world.player2.special, MAX_SPECIAL);
        assert_eq!(world.timer, ROUND_SECONDS);
        assert_eq!(world.winner, None);
        assert_eq!(world.round, 1);
    }

    #[test]
    fn rematch_increments_round() {
        let mut world = WorldState::new();
        world.start_round();
        world.player2.hp = 0.0;
        world.resolve_knockout();
        assert_eq!(world.winner, Some(Winner::Player1));

        world.start_round();
        assert_eq!(world.round, 2);
        assert_eq!(world.winner, None);
    }

    #[test]
    fn knockout_awards_the_opponent_of_the_downed_side() {
        assert_eq!(Side::Player1.opponent_wins(), Winner::Player2);
        assert_eq!(Side::Player2.opponent_wins(), Winner::Player1);

        let mut world = WorldState::new();
        world.start_round();
        world.player2.hp = 0.0;
        world.resolve_knockout();
        assert_eq!(world.winner, Some(Winner::Player1));
        assert_eq!(world.phase, RoundPhase::Ended);
    }

    #[test]
    fn simultaneous_knockout_tie_breaks_for_player2() {
        let mut world = WorldState::new();
        world.start_round();
        world.player1.hp = 0.0;
        world.player2.hp = 0.0;

        world.resolve_knockout();

        assert_eq!(world.winner, Some(Winner::Player2));
        assert_eq!(world.phase, RoundPhase::Ended);
    }

    #[test]
    fn timeout_awards_higher_hp_or_draw() {
        let mut world = WorldState::new();
        world.start_round();
        world.player1.hp = 40.0;
        world.player2.hp = 60.0;
        world.resolve_timeout();
        assert_eq!(world.winner, Some(Winner::Player2));
        assert_eq!(world.timer, 0);

        let mut world = WorldState::new();
        world.start_round();
        world.resolve_timeout();
        assert_eq!(world.winner, Some(Winner::Draw));
    }

    #[test]
    fn start_is_rejected_while_running() {
        let mut world = WorldState::new();
        assert!(world.can_start());
        world.start_round();
        assert!(!world.can_start());
        world.resolve_timeout();
        assert!(world.can_start());
    }

    #[test]
    fn pause_cancels_pending_recoveries() {
        let mut world = WorldState::new();
        world.start_round();
        world.player1.is_attacking = true;
        world.player1.recover_at = Some(tokio::time::Instant::now());

        world.pause();

        assert_eq!(world.phase, RoundPhase::Idle);
        assert!(world.player1.recover_at.is_none());
    }
}
