//! Game room - the authoritative simulation scheduler
//!
//! A single actor task owns the world state and all sessions. Connection
//! events, input reports, the ~60 Hz tick, the 1 Hz round timer and the
//! delayed attack recoveries are all serviced on this one task, so no two
//! sources of mutation ever run concurrently against the same world.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::util::time::{
    unix_millis, COMBO_DECAY_MILLIS, NORMAL_RECOVERY_MILLIS, SPECIAL_RECOVERY_MILLIS, TICK_MILLIS,
    TIMER_MILLIS,
};
use crate::ws::protocol::{
    ClientMsg, ControlScheme, Facing, GameStatus, Role, ServerMsg, WorldSnapshot,
};

use super::broadcast::BroadcastGateway;
use super::combat::{self, AttackKind};
use super::physics::{self, ARENA_MAX_X, ARENA_MIN_X, MOVE_SPEED};
use super::session::{InputFrame, SessionTable};
use super::world::{Fighter, RoundPhase, Side, WorldState, MAX_SPECIAL, SPECIAL_REGEN};

/// Events delivered to the room's mailbox
#[derive(Debug)]
pub enum RoomEvent {
    Connect {
        conn_id: Uuid,
        tx: mpsc::UnboundedSender<ServerMsg>,
    },
    Disconnect {
        conn_id: Uuid,
    },
    Client {
        conn_id: Uuid,
        msg: ClientMsg,
    },
}

/// Occupancy counters shared with the HTTP status endpoints
#[derive(Debug, Default)]
pub struct Occupancy {
    player1: AtomicBool,
    player2: AtomicBool,
    players: AtomicU32,
    started: AtomicBool,
}

impl Occupancy {
    pub fn player1_connected(&self) -> bool {
        self.player1.load(Ordering::Relaxed)
    }

    pub fn player2_connected(&self) -> bool {
        self.player2.load(Ordering::Relaxed)
    }

    pub fn player_total(&self) -> u32 {
        self.players.load(Ordering::Relaxed)
    }

    pub fn game_status(&self) -> GameStatus {
        if self.started.load(Ordering::Relaxed) {
            GameStatus::Running
        } else {
            GameStatus::Waiting
        }
    }

    fn store(&self, player1: bool, player2: bool, players: u32, started: bool) {
        self.player1.store(player1, Ordering::Relaxed);
        self.player2.store(player2, Ordering::Relaxed);
        self.players.store(players, Ordering::Relaxed);
        self.started.store(started, Ordering::Relaxed);
    }
}

/// Handle to the running room
#[derive(Clone)]
pub struct RoomHandle {
    pub events_tx: mpsc::Sender<RoomEvent>,
    pub snapshot_rx: watch::Receiver<WorldSnapshot>,
    pub occupancy: Arc<Occupancy>,
}

/// The authoritative game room
pub struct GameRoom {
    world: WorldState,
    sessions: SessionTable,
    gateway: BroadcastGateway,
    events_rx: mpsc::Receiver<RoomEvent>,
    occupancy: Arc<Occupancy>,
    /// Meter cost of a special attack (game-balance parameter)
    special_cost: f32,
}

impl GameRoom {
    pub fn new(special_cost: f32) -> (Self, RoomHandle) {
        let (events_tx, events_rx) = mpsc::channel(256);
        let world = WorldState::new();
        let (gateway, snapshot_rx) = BroadcastGateway::new(world.snapshot());
        let occupancy = Arc::new(Occupancy::default());

        let handle = RoomHandle {
            events_tx,
            snapshot_rx,
            occupancy: occupancy.clone(),
        };

        let room = Self {
            world,
            sessions: SessionTable::new(),
            gateway,
            events_rx,
            occupancy,
            special_cost,
        };

        (room, handle)
    }

    /// Run the room actor loop. Both periodic processes and the recovery
    /// deadlines are multiplexed here; starting a round resets the
    /// intervals, so there is never more than one live tick or timer
    /// source for a round.
    pub async fn run(mut self) {
        info!("game room started");

        let mut tick = interval(Duration::from_millis(TICK_MILLIS));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut timer = interval(Duration::from_millis(TIMER_MILLIS));
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // Recovery deadlines live in the world; none pending means
            // park the arm far in the future.
            let recovery_at = self
                .earliest_recovery()
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => {
                            if self.handle_event(event) {
                                tick.reset();
                                timer.reset();
                            }
                        }
                        None => {
                            info!("all room handles dropped, stopping room");
                            break;
                        }
                    }
                }
                _ = tick.tick() => self.run_tick(unix_millis()),
                _ = timer.tick() => self.run_timer_tick(),
                _ = sleep_until(recovery_at) => self.fire_due_recoveries(Instant::now()),
            }
        }
    }

    /// Dispatch one mailbox event. Returns true when a round started and
    /// the periodic intervals must be re-aligned.
    fn handle_event(&mut self, event: RoomEvent) -> bool {
        match event {
            RoomEvent::Connect { conn_id, tx } => {
                self.handle_connect(conn_id, tx);
                false
            }
            RoomEvent::Disconnect { conn_id } => {
                self.handle_disconnect(conn_id);
                false
            }
            RoomEvent::Client { conn_id, msg } => match msg {
                ClientMsg::PlayerAction { keys, is_mobile } => {
                    self.handle_input(conn_id, &keys, is_mobile);
                    false
                }
                ClientMsg::StartGame => self.handle_start_game(conn_id),
            },
        }
    }

    fn handle_connect(&mut self, conn_id: Uuid, tx: mpsc::UnboundedSender<ServerMsg>) {
        self.gateway.register(conn_id, tx);
        let role = self.sessions.connect(conn_id);

        let (controls, position) = match role {
            Role::Player1 => (Some(ControlScheme::player1()), Some("left")),
            Role::Player2 => (Some(ControlScheme::player2()), Some("right")),
            Role::Spectator => (None, None),
        };

        info!(conn_id = %conn_id, role = ?role, peers = self.gateway.peer_count(), "client connected");

        self.gateway.send_to(
            conn_id,
            ServerMsg::AssignPlayer {
                role,
                controls,
                position,
            },
        );
        self.broadcast_players_update();
        self.gateway
            .send_to(conn_id, ServerMsg::GameStateUpdate(self.world.snapshot()));
    }

    fn handle_disconnect(&mut self, conn_id: Uuid) {
        self.gateway.unregister(conn_id);
        let role = self.sessions.disconnect(conn_id);
        info!(conn_id = %conn_id, role = ?role, "client disconnected");

        // A missing combatant cannot continue a round
        if matches!(role, Some(Role::Player1 | Role::Player2)) && self.world.is_running() {
            self.world.pause();
            info!("round paused, player slot vacated");
        }

        self.broadcast_players_update();
        self.broadcast_state();
    }

    fn handle_input(&mut self, conn_id: Uuid, keys: &HashMap<String, bool>, is_mobile: bool) {
        if !self.sessions.store_input(conn_id, keys, is_mobile) {
            debug!(conn_id = %conn_id, "input from non-player dropped");
        }
    }

    /// startGame request. Silently ignored from spectators or while a
    /// round is already running.
    fn handle_start_game(&mut self, conn_id: Uuid) -> bool {
        let role = self.sessions.role_of(conn_id);
        if !matches!(role, Some(Role::Player1 | Role::Player2)) {
            debug!(conn_id = %conn_id, "startGame from spectator ignored");
            return false;
        }
        if !self.world.can_start() {
            debug!(conn_id = %conn_id, "startGame while round running ignored");
            return false;
        }

        self.world.start_round();
        info!(conn_id = %conn_id, round = self.world.round, "round started");

        self.sync_occupancy();
        self.broadcast_state();
        true
    }

    /// One simulation tick: inputs, combat, physics, meters, win check,
    /// broadcast. Inert unless a round is running (the loop keeps firing
    /// after a winner is set, but this guard rejects all mutation).
    fn run_tick(&mut self, now_ms: u64) {
        if !self.world.is_running() {
            return;
        }

        let frame1 = self.sessions.take_frame(Role::Player1);
        let frame2 = self.sessions.take_frame(Role::Player2);

        self.step_fighter(Side::Player1, frame1, now_ms);
        self.step_fighter(Side::Player2, frame2, now_ms);

        self.world.resolve_knockout();
        if self.world.phase == RoundPhase::Ended {
            info!(winner = ?self.world.winner, "round ended by knockout");
            self.sync_occupancy();
        }

        self.broadcast_state();
    }

    /// Apply one fighter's tick, in the fixed player1-then-player2 order
    fn step_fighter(&mut self, side: Side, frame: InputFrame, now_ms: u64) {
        let special_cost = self.special_cost;
        let (fighter, opponent) = self.world.pair_mut(side);

        // Movement and facing
        if frame.left {
            fighter.x = (fighter.x - MOVE_SPEED).max(ARENA_MIN_X);
            fighter.facing = Facing::Left;
        }
        if frame.right {
            fighter.x = (fighter.x + MOVE_SPEED).min(ARENA_MAX_X);
            fighter.facing = Facing::Right;
        }
        if frame.jump && !fighter.is_jumping {
            fighter.is_jumping = true;
            fighter.jump_velocity = physics::JUMP_VELOCITY;
        }
        fighter.is_blocking = frame.block;

        // Normal attack, gated on recovery
        if frame.attack && !fighter.is_attacking {
            Self::launch_attack(fighter, opponent, AttackKind::Normal, now_ms);
        }

        // Special attack: drains the meter, longer recovery
        if frame.special && !fighter.is_attacking && fighter.special >= special_cost {
            fighter.special = (fighter.special - special_cost).max(0.0);
            Self::launch_attack(fighter, opponent, AttackKind::Special, now_ms);
        }

        physics::integrate(fighter);

        fighter.special = (fighter.special + SPECIAL_REGEN).min(MAX_SPECIAL);

        if now_ms.saturating_sub(fighter.last_attack_ms) > COMBO_DECAY_MILLIS {
            fighter.combo = 0;
        }
    }

    fn launch_attack(fighter: &mut Fighter, opponent: &mut Fighter, kind: AttackKind, now_ms: u64) {
        fighter.is_attacking = true;
        fighter.last_attack_ms = now_ms;

        let outcome = combat::resolve(fighter, opponent, kind);
        opponent.hp = outcome.defender_hp;
        fighter.combo = if outcome.combo_broken {
            0
        } else {
            fighter.combo + 1
        };

        let recovery = match kind {
            AttackKind::Normal => NORMAL_RECOVERY_MILLIS,
            AttackKind::Special => SPECIAL_RECOVERY_MILLIS,
        };
        fighter.recover_at = Some(Instant::now() + Duration::from_millis(recovery));
    }

    /// One round-timer decrement. Inert unless running, so the countdown
    /// stops by itself once a winner is set or the round pauses.
    fn run_timer_tick(&mut self) {
        if !self.world.is_running() {
            return;
        }

        self.world.timer = self.world.timer.saturating_sub(1);
        if self.world.timer == 0 {
            self.world.resolve_timeout();
            info!(winner = ?self.world.winner, "round ended by timeout");
            self.sync_occupancy();
        }

        self.broadcast_state();
    }

    /// Earliest pending attack-recovery deadline
    fn earliest_recovery(&self) -> Option<Instant> {
        [
            self.world.player1.recover_at,
            self.world.player2.recover_at,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Clear attack recoveries whose deadline passed. Fires between ticks
    /// and triggers its own broadcast so clients see the pose change even
    /// when the fighter receives no further input.
    fn fire_due_recoveries(&mut self, now: Instant) {
        let mut fired = false;
        for fighter in [&mut self.world.player1, &mut self.world.player2] {
            if fighter.recover_at.is_some_and(|at| at <= now) {
                fighter.is_attacking = false;
                fighter.recover_at = None;
                fired = true;
            }
        }
        if fired {
            self.broadcast_state();
        }
    }

    fn broadcast_state(&self) {
        let snapshot = self.world.snapshot();
        self.gateway.publish_snapshot(snapshot.clone());
        self.gateway.broadcast(ServerMsg::GameStateUpdate(snapshot));
    }

    fn broadcast_players_update(&self) {
        self.sync_occupancy();
        self.gateway.broadcast(ServerMsg::PlayersUpdate {
            player1_connected: self.sessions.player1_connected(),
            player2_connected: self.sessions.player2_connected(),
            total: self.sessions.player_count(),
            game_status: self.game_status(),
        });
    }

    fn game_status(&self) -> GameStatus {
        if self.world.phase == RoundPhase::Idle {
            GameStatus::Waiting
        } else {
            GameStatus::Running
        }
    }

    fn sync_occupancy(&self) {
        self.occupancy.store(
            self.sessions.player1_connected(),
            self.sessions.player2_connected(),
            self.sessions.player_count(),
            self.world.phase != RoundPhase::Idle,
        );
    }
}
