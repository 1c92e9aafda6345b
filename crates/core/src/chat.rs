//! Chat message roles.
//!
//! A conversation turn is persisted as one row per speaker. The set of roles
//! is closed and mirrored by a `CHECK` constraint on `chat_messages.role`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Text typed by the human user.
    User,
    /// Reply produced by the AI travel agent.
    Agent,
    /// Out-of-band notices (errors, session markers).
    System,
}

/// Every accepted role name, in declaration order.
pub const MESSAGE_ROLES: &[&str] = &["user", "agent", "system"];

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Agent => "agent",
            MessageRole::System => "system",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "agent" => Ok(MessageRole::Agent),
            "system" => Ok(MessageRole::System),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {}",
                MESSAGE_ROLES.join(", ")
            ))),
        }
    }
}
