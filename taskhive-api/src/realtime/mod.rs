//! Realtime propagation for project rooms.
//!
//! - `rooms`: registry mapping project ids to broadcast channels
//! - `socket`: the `/ws` endpoint and per-connection state machine
//!
//! Task route handlers publish event frames through the registry after
//! their database mutation commits; sockets only ever receive.

pub mod rooms;
pub mod socket;
