//! Tag coordination: who is "it", cooldown and proximity transfers

use std::time::Instant;

use tracing::info;
use uuid::Uuid;

use super::constants::{TAG_COOLDOWN, TAG_DISTANCE, TAG_REWARD};
use super::world::Player;

/// A completed transfer of "it"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagTransfer {
    pub from: Uuid,
    pub to: Uuid,
}

/// Single shared "it" state machine
#[derive(Debug, Clone)]
pub struct TagCoordinator {
    it: Option<Uuid>,
    last_tag_at: Instant,
}

impl TagCoordinator {
    /// The cooldown clock starts at world creation.
    pub fn new(started_at: Instant) -> Self {
        Self {
            it: None,
            last_tag_at: started_at,
        }
    }

    pub fn it(&self) -> Option<Uuid> {
        self.it
    }

    /// Change the holder without touching the cooldown clock (joins and disconnects).
    pub fn assign(&mut self, holder: Option<Uuid>) {
        self.it = holder;
    }

    pub fn cooldown_elapsed(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_tag_at) > TAG_COOLDOWN
    }

    /// Check the "it" holder against every other player, in registry order,
    /// and hand "it" to the first one in range. At most one transfer per call.
    pub fn evaluate(&mut self, players: &mut [Player], now: Instant) -> Option<TagTransfer> {
        let it_id = self.it?;
        if !self.cooldown_elapsed(now) {
            return None;
        }

        let it_idx = players.iter().position(|p| p.id == it_id)?;
        let it_pos = players[it_idx].body.position;

        let target_idx = players
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != it_idx)
            .find(|(_, p)| it_pos.distance_to(&p.body.position) < TAG_DISTANCE)
            .map(|(idx, _)| idx)?;

        let outgoing = &mut players[it_idx];
        outgoing.score = outgoing.score.saturating_add(TAG_REWARD);
        outgoing.is_it = false;

        let incoming = &mut players[target_idx];
        incoming.is_it = true;
        let target_id = incoming.id;

        self.it = Some(target_id);
        self.last_tag_at = now;

        info!(from = %it_id, to = %target_id, "Tag transfer");

        Some(TagTransfer {
            from: it_id,
            to: target_id,
        })
    }
}
