//! Passive scoring for everyone who is not "it"

use super::constants::SURVIVAL_REWARD;
use super::world::Player;

/// Award the survival reward to every player not holding "it".
/// Returns how many players scored.
pub fn award_survival_points(players: &mut [Player]) -> usize {
    let mut awarded = 0;
    for player in players.iter_mut().filter(|p| !p.is_it) {
        player.score = player.score.saturating_add(SURVIVAL_REWARD);
        awarded += 1;
    }
    awarded
}
