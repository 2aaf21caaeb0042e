//! Player registry and the world aggregate (owned by the game runner)

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::constants::SPAWN_POSITION;
use super::geometry::{Platform, PLATFORMS};
use super::physics::{Body, PhysicsSystem};
use super::scoring::award_survival_points;
use super::tag::TagCoordinator;
use super::{InputState, Position, SoundCue};

/// Authoritative per-connection player state
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub body: Body,
    pub is_it: bool,
    pub score: u32,
    /// Latest input; overwritten, never queued
    pub input: InputState,
}

impl Player {
    pub fn new(id: Uuid, body: Body) -> Self {
        Self {
            id,
            body,
            is_it: false,
            score: 0,
            input: InputState::default(),
        }
    }
}

/// Discrete things that happened while mutating the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    /// A player was removed from the registry
    PlayerLeft(Uuid),
    /// "it" moved to this player (tag or reassignment)
    ItChanged(Uuid),
    /// A sound cue every client should play
    Sound(SoundCue),
}

/// Players, static geometry and the tag state
pub struct World {
    /// Registry order is insertion order
    players: Vec<Player>,
    platforms: Vec<Platform>,
    tag: TagCoordinator,
    rng: ChaCha8Rng,
    tick: u64,
}

impl World {
    /// World on the standard course
    pub fn new(seed: u64, started_at: Instant) -> Self {
        Self::with_platforms(PLATFORMS.to_vec(), seed, started_at)
    }

    pub fn with_platforms(platforms: Vec<Platform>, seed: u64, started_at: Instant) -> Self {
        Self {
            players: Vec::new(),
            platforms,
            tag: TagCoordinator::new(started_at),
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, id: &Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == *id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Current "it" holder
    pub fn it(&self) -> Option<Uuid> {
        self.tag.it()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Add a player at the spawn point. The first player into an empty
    /// world becomes "it".
    pub fn register(&mut self, id: Uuid) -> &Player {
        if let Some(idx) = self.index_of(&id) {
            warn!(player_id = %id, "Player already registered");
            return &self.players[idx];
        }

        let [x, y, z] = SPAWN_POSITION;
        let mut player = Player::new(id, Body::at_rest(Position::new(x, y, z)));

        if self.tag.it().is_none() {
            player.is_it = true;
            self.tag.assign(Some(id));
            info!(player_id = %id, "First player is it");
        }

        self.players.push(player);
        info!(player_id = %id, player_count = self.players.len(), "Player registered");

        let last = self.players.len() - 1;
        &self.players[last]
    }

    /// Drop a player. If they held "it", a random remaining player inherits it;
    /// the tag cooldown clock is left alone.
    pub fn remove(&mut self, id: &Uuid) -> Vec<WorldEvent> {
        let mut events = Vec::new();

        let Some(idx) = self.index_of(id) else {
            debug!(player_id = %id, "Remove for unknown player");
            return events;
        };
        let removed = self.players.remove(idx);

        if removed.is_it {
            if self.players.is_empty() {
                self.tag.assign(None);
            } else {
                let pick = self.rng.gen_range(0..self.players.len());
                let heir = &mut self.players[pick];
                heir.is_it = true;
                self.tag.assign(Some(heir.id));
                info!(player_id = %heir.id, "It reassigned after disconnect");
                events.push(WorldEvent::ItChanged(heir.id));
            }
        }

        info!(player_id = %id, player_count = self.players.len(), "Player removed");
        events.push(WorldEvent::PlayerLeft(*id));
        events
    }

    /// Overwrite a player's pending input. Unknown players are ignored.
    pub fn set_input(&mut self, id: &Uuid, input: InputState) -> bool {
        match self.players.iter_mut().find(|p| p.id == *id) {
            Some(player) => {
                player.input = input;
                true
            }
            None => false,
        }
    }

    /// One simulation pass: physics for every player, then tagging.
    pub fn tick(&mut self, now: Instant) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        self.tick += 1;

        for player in self.players.iter_mut() {
            if PhysicsSystem::step(&mut player.body, &player.input, &self.platforms) {
                events.push(WorldEvent::Sound(SoundCue::Jump));
            }
        }

        if let Some(transfer) = self.tag.evaluate(&mut self.players, now) {
            events.push(WorldEvent::ItChanged(transfer.to));
            events.push(WorldEvent::Sound(SoundCue::Tag));
        }

        events
    }

    /// Passive scoring pass
    pub fn award_survival_points(&mut self) -> usize {
        award_survival_points(&mut self.players)
    }

    fn index_of(&self, id: &Uuid) -> Option<usize> {
        self.players.iter().position(|p| p.id == *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::{TAG_COOLDOWN, TAG_REWARD};
    use std::time::Duration;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn floor_only() -> Vec<Platform> {
        vec![Platform::new(-15.0, 15.0, -15.0, 15.0, 0.0)]
    }

    fn holders(world: &World) -> Vec<Uuid> {
        world
            .players()
            .iter()
            .filter(|p| p.is_it)
            .map(|p| p.id)
            .collect()
    }

    fn assert_single_it(world: &World) {
        let holders = holders(world);
        if world.is_empty() {
            assert!(holders.is_empty());
            assert_eq!(world.it(), None);
        } else {
            assert_eq!(holders.len(), 1);
            assert_eq!(world.it(), Some(holders[0]));
        }
    }

    #[test]
    fn first_player_spawns_as_it() {
        let mut world = World::new(7, Instant::now());
        let player = world.register(id(1));

        assert!(player.is_it);
        assert_eq!(player.score, 0);
        assert!(player.body.grounded);
        assert_eq!(player.body.position, Position::new(0.0, 1.0, 0.0));

        let second = world.register(id(2));
        assert!(!second.is_it);
        assert_eq!(world.it(), Some(id(1)));
        assert_single_it(&world);
    }

    #[test]
    fn duplicate_register_keeps_existing_player() {
        let mut world = World::new(7, Instant::now());
        world.register(id(1));
        world.set_input(&id(1), InputState { left: true, ..Default::default() });
        world.register(id(1));

        assert_eq!(world.len(), 1);
        assert!(world.get(&id(1)).is_some_and(|p| p.input.left));
    }

    #[test]
    fn spawn_settles_on_central_platform_after_one_tick() {
        let start = Instant::now();
        let mut world = World::new(7, start);
        world.register(id(1));

        let events = world.tick(start + Duration::from_millis(16));

        assert!(events.is_empty());
        let body = world.get(&id(1)).map(|p| p.body);
        assert_eq!(body.map(|b| b.position.y), Some(1.5));
        assert_eq!(body.map(|b| b.grounded), Some(true));
    }

    #[test]
    fn last_player_leaving_clears_it() {
        let mut world = World::new(7, Instant::now());
        world.register(id(1));

        let events = world.remove(&id(1));
        assert_eq!(events, vec![WorldEvent::PlayerLeft(id(1))]);
        assert_eq!(world.it(), None);
        assert_single_it(&world);

        let newcomer = world.register(id(2));
        assert!(newcomer.is_it);
        assert_eq!(world.it(), Some(id(2)));
    }

    #[test]
    fn it_leaving_reassigns_to_a_remaining_player() {
        let mut world = World::new(7, Instant::now());
        for n in 1..=4 {
            world.register(id(n));
        }

        let events = world.remove(&id(1));
        let heir = world.it().expect("someone inherits it");

        assert_ne!(heir, id(1));
        assert_eq!(
            events,
            vec![WorldEvent::ItChanged(heir), WorldEvent::PlayerLeft(id(1))]
        );
        assert_single_it(&world);
    }

    #[test]
    fn reassignment_is_deterministic_for_a_seed() {
        let pick = |seed: u64| {
            let mut world = World::new(seed, Instant::now());
            for n in 1..=8 {
                world.register(id(n));
            }
            world.remove(&id(1));
            world.it()
        };

        assert_eq!(pick(42), pick(42));
    }

    #[test]
    fn non_it_leaving_does_not_touch_it() {
        let mut world = World::new(7, Instant::now());
        world.register(id(1));
        world.register(id(2));

        let events = world.remove(&id(2));
        assert_eq!(events, vec![WorldEvent::PlayerLeft(id(2))]);
        assert_eq!(world.it(), Some(id(1)));
    }

    #[test]
    fn unknown_identities_are_ignored() {
        let mut world = World::new(7, Instant::now());
        assert!(!world.set_input(&id(9), InputState::default()));
        assert!(world.remove(&id(9)).is_empty());
    }

    #[test]
    fn repeated_identical_input_changes_nothing() {
        let mut world = World::new(7, Instant::now());
        world.register(id(1));
        let input = InputState { right: true, ..Default::default() };

        world.set_input(&id(1), input);
        let once = world.get(&id(1)).map(|p| (p.input, p.body));
        world.set_input(&id(1), input);
        world.set_input(&id(1), input);
        let thrice = world.get(&id(1)).map(|p| (p.input, p.body));

        assert_eq!(once, thrice);
    }

    #[test]
    fn tag_after_cooldown_since_world_start() {
        let start = Instant::now();
        let mut world = World::with_platforms(floor_only(), 7, start);
        world.register(id(1));
        world.register(id(2));

        // Both settle on the floor at the same spot, well within range.
        let early = world.tick(start + Duration::from_secs(1));
        assert!(!early.contains(&WorldEvent::ItChanged(id(2))));
        assert_eq!(world.it(), Some(id(1)));
        assert_eq!(world.get(&id(1)).map(|p| p.score), Some(0));

        let events = world.tick(start + TAG_COOLDOWN + Duration::from_millis(1));
        assert_eq!(
            events,
            vec![
                WorldEvent::ItChanged(id(2)),
                WorldEvent::Sound(SoundCue::Tag)
            ]
        );
        assert_eq!(world.get(&id(1)).map(|p| p.score), Some(TAG_REWARD));
        assert_eq!(world.get(&id(2)).map(|p| p.score), Some(0));
        assert_single_it(&world);
    }

    #[test]
    fn no_tag_while_cooldown_has_not_elapsed() {
        let start = Instant::now();
        let mut world = World::new(7, start);
        world.register(id(1));
        world.register(id(2));

        let events = world.tick(start + TAG_COOLDOWN);
        assert!(events.is_empty());
        assert_eq!(world.it(), Some(id(1)));
        assert!(world.players().iter().all(|p| p.score == 0));
    }

    #[test]
    fn tags_are_spaced_by_the_cooldown() {
        let start = Instant::now();
        let mut world = World::new(7, start);
        world.register(id(1));
        world.register(id(2));

        // Two stacked players tick for 20 simulated seconds at 60 Hz.
        let mut transfers = Vec::new();
        for n in 1..=1200u64 {
            let now = start + Duration::from_micros(n * 16_667);
            for event in world.tick(now) {
                if let WorldEvent::ItChanged(_) = event {
                    transfers.push(now);
                }
            }
            assert_single_it(&world);
        }

        assert!(transfers.len() >= 3);
        for pair in transfers.windows(2) {
            assert!(pair[1] - pair[0] > TAG_COOLDOWN);
        }
    }

    #[test]
    fn held_jump_emits_a_single_sound_per_jump() {
        let start = Instant::now();
        let mut world = World::new(7, start);
        world.register(id(1));
        world.tick(start);
        world.set_input(&id(1), InputState { jump: true, ..Default::default() });

        let jumps = (0..20)
            .flat_map(|_| world.tick(start))
            .filter(|e| *e == WorldEvent::Sound(SoundCue::Jump))
            .count();

        assert_eq!(jumps, 1);
    }

    #[test]
    fn scores_never_decrease() {
        let start = Instant::now();
        let mut world = World::new(7, start);
        world.register(id(1));
        world.register(id(2));
        world.register(id(3));

        let mut last: Vec<u32> = world.players().iter().map(|p| p.score).collect();
        for n in 1..=900u64 {
            world.tick(start + Duration::from_millis(n * 17));
            if n % 300 == 0 {
                assert_eq!(world.award_survival_points(), 2);
            }
            let now: Vec<u32> = world.players().iter().map(|p| p.score).collect();
            assert!(now.iter().zip(&last).all(|(a, b)| a >= b));
            last = now;
        }
    }

    #[test]
    fn empty_world_ticks_quietly() {
        let start = Instant::now();
        let mut world = World::new(7, start);

        assert!(world.tick(start + TAG_COOLDOWN * 2).is_empty());
        assert_eq!(world.award_survival_points(), 0);
        assert_eq!(world.tick_count(), 1);
    }
}
