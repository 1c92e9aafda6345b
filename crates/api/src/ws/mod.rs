//! WebSocket chatroom: a room-scoped broadcast relay.
//!
//! - [`protocol`] -- client and server event frames.
//! - [`room`] -- per-connection state and its transitions.
//! - [`hub`] -- connection registry and room fan-out.

mod handler;
mod heartbeat;
pub mod hub;
pub mod protocol;
pub mod room;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use hub::RoomHub;
