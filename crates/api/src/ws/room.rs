//! Per-connection chatroom state.
//!
//! Each connection is in at most one room at a time. Client events are
//! applied as pure transitions on [`ConnectionState`], which return the
//! [`RoomEffect`]s the connection task then performs against the
//! [`RoomHub`](crate::ws::RoomHub).

use crate::ws::protocol::{ClientEvent, ServerEvent};

/// A side effect requested by a state transition, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEffect {
    /// Add this connection to `room`.
    Enter(String),
    /// Remove this connection from `room`.
    Exit(String),
    /// Deliver `event` to every current member of `room`.
    Broadcast { room: String, event: ServerEvent },
}

/// Identity and membership of one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// Name given on the most recent join. Not authenticated.
    pub username: Option<String>,
    pub current_room: Option<String>,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one client event.
    pub fn apply(&mut self, event: ClientEvent) -> Vec<RoomEffect> {
        match event {
            ClientEvent::JoinRoom { username, room } => self.join(username, room),
            ClientEvent::LeaveRoom { room, .. } => self.leave(&room),
            ClientEvent::ChatMessage { message, room } => self.chat(message, &room),
        }
    }

    /// The connection went away: leave the current room, if any.
    pub fn disconnect(&mut self) -> Vec<RoomEffect> {
        let Some(room) = self.current_room.take() else {
            return Vec::new();
        };
        let name = self.display_name();
        vec![
            RoomEffect::Exit(room.clone()),
            RoomEffect::Broadcast {
                room,
                event: ServerEvent::SystemMessage(format!("{name} has disconnected")),
            },
        ]
    }

    /// Joining while already in another room leaves that room first.
    fn join(&mut self, username: String, room: String) -> Vec<RoomEffect> {
        let username = username.trim().to_string();
        if username.is_empty() || room.trim().is_empty() {
            return Vec::new();
        }

        if self.current_room.as_deref() == Some(room.as_str()) {
            self.username = Some(username);
            return Vec::new();
        }

        let mut effects = match self.current_room.clone() {
            Some(previous) => self.leave(&previous),
            None => Vec::new(),
        };

        self.username = Some(username.clone());
        self.current_room = Some(room.clone());
        effects.push(RoomEffect::Enter(room.clone()));
        effects.push(RoomEffect::Broadcast {
            room,
            event: ServerEvent::SystemMessage(format!("{username} has joined the room")),
        });
        effects
    }

    /// Leaving a room the connection is not in is ignored.
    fn leave(&mut self, room: &str) -> Vec<RoomEffect> {
        if self.current_room.as_deref() != Some(room) {
            return Vec::new();
        }
        self.current_room = None;
        let name = self.display_name();
        vec![
            RoomEffect::Exit(room.to_string()),
            RoomEffect::Broadcast {
                room: room.to_string(),
                event: ServerEvent::SystemMessage(format!("{name} has left the room")),
            },
        ]
    }

    /// Only members of `room` may post to it.
    fn chat(&self, message: String, room: &str) -> Vec<RoomEffect> {
        let (Some(username), Some(current)) = (&self.username, &self.current_room) else {
            return Vec::new();
        };
        if current != room || message.trim().is_empty() {
            return Vec::new();
        }
        vec![RoomEffect::Broadcast {
            room: room.to_string(),
            event: ServerEvent::ChatMessage {
                username: username.clone(),
                message,
            },
        }]
    }

    fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("A user")
    }
}
