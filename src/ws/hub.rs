//! Connection hub - the dynamic set of outbound sinks
//!
//! Each connection owns a bounded queue drained by its writer task. Messages
//! are serialized once and offered to every queue without waiting: a full
//! queue loses that message, a closed one is detached.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::protocol::ServerMsg;

/// Serialized frame shared by every recipient
pub type Frame = Arc<str>;

pub const DEFAULT_CONNECTION_BUFFER: usize = 256;

pub struct ConnectionHub {
    sinks: DashMap<Uuid, mpsc::Sender<Frame>>,
    buffer: usize,
}

impl ConnectionHub {
    pub fn new(buffer: usize) -> Self {
        Self {
            sinks: DashMap::new(),
            buffer: buffer.max(1),
        }
    }

    /// Add a connection; the receiver feeds its writer task.
    pub fn attach(&self, id: Uuid) -> mpsc::Receiver<Frame> {
        let (tx, rx) = mpsc::channel(self.buffer);
        if self.sinks.insert(id, tx).is_some() {
            warn!(player_id = %id, "Replaced existing connection sink");
        }
        rx
    }

    pub fn detach(&self, id: &Uuid) {
        self.sinks.remove(id);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Send to a single connection
    pub fn send_to(&self, id: &Uuid, msg: &ServerMsg) {
        let Some(frame) = encode(msg) else {
            return;
        };
        let closed = match self.sinks.get(id) {
            Some(sink) => !offer(id, &sink, frame),
            None => false,
        };
        if closed {
            self.detach(id);
        }
    }

    /// Send to every connection
    pub fn broadcast(&self, msg: &ServerMsg) {
        self.fan_out(msg, None);
    }

    /// Send to every connection except one
    pub fn broadcast_except(&self, skip: &Uuid, msg: &ServerMsg) {
        self.fan_out(msg, Some(skip));
    }

    fn fan_out(&self, msg: &ServerMsg, skip: Option<&Uuid>) {
        if self.sinks.is_empty() {
            return;
        }
        let Some(frame) = encode(msg) else {
            return;
        };

        let mut closed = Vec::new();
        for entry in self.sinks.iter() {
            if Some(entry.key()) == skip {
                continue;
            }
            if !offer(entry.key(), entry.value(), frame.clone()) {
                closed.push(*entry.key());
            }
        }

        // Removal happens after iteration; DashMap shards are still read-locked inside it.
        for id in closed {
            self.detach(&id);
        }
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTION_BUFFER)
    }
}

fn encode(msg: &ServerMsg) -> Option<Frame> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            error!(error = %e, "Failed to serialize server message");
            None
        }
    }
}

/// Returns false when the connection is gone.
fn offer(id: &Uuid, sink: &mpsc::Sender<Frame>, frame: Frame) -> bool {
    match sink.try_send(frame) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            debug!(player_id = %id, "Connection queue full, dropping message");
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SoundCue;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn broadcast_reaches_everyone() {
        let hub = ConnectionHub::default();
        let mut a = hub.attach(id(1));
        let mut b = hub.attach(id(2));

        hub.broadcast(&ServerMsg::PlaySound(SoundCue::Tag));

        let frame = a.try_recv().expect("a receives");
        assert!(frame.contains("playSound"));
        assert_eq!(b.try_recv().ok(), Some(frame));
    }

    #[test]
    fn broadcast_except_skips_one() {
        let hub = ConnectionHub::default();
        let mut a = hub.attach(id(1));
        let mut b = hub.attach(id(2));

        hub.broadcast_except(&id(1), &ServerMsg::UpdateIt(id(2)));

        assert!(a.try_recv().is_err());
        assert!(b.try_recv().is_ok());
    }

    #[test]
    fn send_to_targets_one_connection() {
        let hub = ConnectionHub::default();
        let mut a = hub.attach(id(1));
        let mut b = hub.attach(id(2));

        hub.send_to(&id(2), &ServerMsg::PlayerDisconnected(id(3)));
        hub.send_to(&id(9), &ServerMsg::PlayerDisconnected(id(3)));

        assert!(a.try_recv().is_err());
        assert!(b.try_recv().is_ok());
    }

    #[test]
    fn slow_connection_drops_instead_of_blocking() {
        let hub = ConnectionHub::new(2);
        let mut slow = hub.attach(id(1));

        for _ in 0..5 {
            hub.broadcast(&ServerMsg::PlaySound(SoundCue::Jump));
        }

        assert!(slow.try_recv().is_ok());
        assert!(slow.try_recv().is_ok());
        assert!(slow.try_recv().is_err());
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn closed_connection_is_detached() {
        let hub = ConnectionHub::default();
        let gone = hub.attach(id(1));
        let _alive = hub.attach(id(2));
        drop(gone);

        hub.broadcast(&ServerMsg::PlaySound(SoundCue::Jump));

        assert_eq!(hub.len(), 1);
        hub.detach(&id(2));
        assert!(hub.is_empty());
    }
}
