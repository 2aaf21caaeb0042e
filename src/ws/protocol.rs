//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//! Every frame is JSON text: `{"type": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::snapshot::{PlayerMap, PlayerView};
use crate::game::{InputState, Position, SoundCue};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Key state changed; replaces the previous input wholesale
    PlayerInput(InputState),
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMsg {
    /// First message on every connection
    Welcome(Welcome),

    /// Everyone already in the world (sent to the new connection only)
    CurrentPlayers(PlayerMap),

    /// Player joined the world (sent to everyone else)
    NewPlayer(NewPlayer),

    /// Player left the world
    PlayerDisconnected(Uuid),

    /// Full state of every player, after each tick and each scoring pass
    UpdatePlayers(PlayerMap),

    /// New "it" holder
    UpdateIt(Uuid),

    /// Sound cue to play
    PlaySound(SoundCue),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub id: Uuid,
    pub server_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub id: Uuid,
    pub position: Position,
    pub is_it: bool,
}

impl NewPlayer {
    pub fn new(id: Uuid, view: &PlayerView) -> Self {
        Self {
            id,
            position: view.position,
            is_it: view.is_it,
        }
    }
}
