//! WebSocket session gateway

pub mod handler;
pub mod hub;
pub mod protocol;

pub use hub::ConnectionHub;
