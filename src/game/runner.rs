//! Authoritative game loop
//!
//! One task owns the [`World`]. Connections reach it only through
//! [`GameHandle`] commands, and commands are handled between passes, so a
//! tick or scoring pass always sees a stable registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval, interval_at, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::util::time::{scoring_interval, tick_duration};
use crate::ws::hub::ConnectionHub;
use crate::ws::protocol::{NewPlayer, ServerMsg};

use super::snapshot::{self, PlayerView};
use super::world::{World, WorldEvent};
use super::InputState;

/// Work submitted by the session gateway
#[derive(Debug, Clone)]
pub enum GameCommand {
    Join { player_id: Uuid },
    Input { player_id: Uuid, input: InputState },
    Leave { player_id: Uuid },
}

/// The game loop has stopped
#[derive(Debug, thiserror::Error)]
#[error("game loop is not running")]
pub struct GameClosed;

/// Cloneable handle to the running game loop
#[derive(Clone)]
pub struct GameHandle {
    command_tx: mpsc::Sender<GameCommand>,
    player_count: Arc<AtomicUsize>,
}

impl GameHandle {
    pub async fn join(&self, player_id: Uuid) -> Result<(), GameClosed> {
        self.send(GameCommand::Join { player_id }).await
    }

    pub async fn input(&self, player_id: Uuid, input: InputState) -> Result<(), GameClosed> {
        self.send(GameCommand::Input { player_id, input }).await
    }

    pub async fn leave(&self, player_id: Uuid) -> Result<(), GameClosed> {
        self.send(GameCommand::Leave { player_id }).await
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    async fn send(&self, command: GameCommand) -> Result<(), GameClosed> {
        self.command_tx.send(command).await.map_err(|_| GameClosed)
    }
}

pub struct GameRunner {
    world: World,
    command_rx: mpsc::Receiver<GameCommand>,
    hub: Arc<ConnectionHub>,
    player_count: Arc<AtomicUsize>,
}

impl GameRunner {
    pub fn new(world: World, hub: Arc<ConnectionHub>) -> (Self, GameHandle) {
        let (command_tx, command_rx) = mpsc::channel(1024);
        let player_count = Arc::new(AtomicUsize::new(world.len()));

        let handle = GameHandle {
            command_tx,
            player_count: player_count.clone(),
        };

        let runner = Self {
            world,
            command_rx,
            hub,
            player_count,
        };

        (runner, handle)
    }

    /// Run until `shutdown` flips to true or every handle is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Game loop started");

        let mut tick_interval = interval(tick_duration());
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Scoring starts one full period in, not immediately.
        let mut scoring = interval_at(
            tokio::time::Instant::now() + scoring_interval(),
            scoring_interval(),
        );
        scoring.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        debug!("All game handles dropped");
                        break;
                    }
                },
                _ = tick_interval.tick() => self.run_tick(Instant::now()),
                _ = scoring.tick() => self.run_scoring(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(ticks = self.world.tick_count(), "Game loop stopped");
    }

    pub fn handle_command(&mut self, command: GameCommand) {
        match command {
            GameCommand::Join { player_id } => self.handle_join(player_id),
            GameCommand::Input { player_id, input } => {
                if !self.world.set_input(&player_id, input) {
                    debug!(player_id = %player_id, "Input for unknown player ignored");
                }
            }
            GameCommand::Leave { player_id } => self.handle_leave(player_id),
        }
    }

    /// Physics, tagging, then the per-tick snapshot
    pub fn run_tick(&mut self, now: Instant) {
        let events = self.world.tick(now);
        self.publish(&events);
        self.broadcast_snapshot();
    }

    /// Passive scoring, then a snapshot carrying the new scores
    pub fn run_scoring(&mut self) {
        let awarded = self.world.award_survival_points();
        debug!(awarded, "Scoring pass");
        self.broadcast_snapshot();
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    fn handle_join(&mut self, player_id: Uuid) {
        let view = PlayerView::from(self.world.register(player_id));
        self.sync_player_count();

        self.hub
            .send_to(&player_id, &ServerMsg::CurrentPlayers(snapshot::build(&self.world)));
        self.hub.broadcast_except(
            &player_id,
            &ServerMsg::NewPlayer(NewPlayer::new(player_id, &view)),
        );
    }

    fn handle_leave(&mut self, player_id: Uuid) {
        let events = self.world.remove(&player_id);
        self.sync_player_count();
        self.publish(&events);
    }

    fn publish(&self, events: &[WorldEvent]) {
        for event in events {
            let msg = match *event {
                WorldEvent::PlayerLeft(id) => ServerMsg::PlayerDisconnected(id),
                WorldEvent::ItChanged(id) => ServerMsg::UpdateIt(id),
                WorldEvent::Sound(cue) => ServerMsg::PlaySound(cue),
            };
            self.hub.broadcast(&msg);
        }
    }

    fn broadcast_snapshot(&self) {
        if self.hub.is_empty() {
            return;
        }
        self.hub
            .broadcast(&ServerMsg::UpdatePlayers(snapshot::build(&self.world)));
    }

    fn sync_player_count(&self) {
        self.player_count.store(self.world.len(), Ordering::Relaxed);
    }
}
