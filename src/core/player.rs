//! Player identity and permission roles.
//!
//! ## Player
//!
//! A connected participant: stable id plus display attributes. The id is a
//! session-independent identity assigned by the lobby layer, never a
//! transient connection identifier.
//!
//! ## Role
//!
//! Events in a configuration are permissioned by role, not by id. The role
//! of an actor is resolved at event time: the configured host id maps to
//! `Host`, every other roster id maps to `Player`, and the reserved
//! synthetic actor [`SERVER_ACTOR`] maps to `Server`. Unknown ids resolve
//! to no role at all and are denied everything.

use serde::{Deserialize, Serialize};

/// Reserved actor id for system-triggered events (timer expiry).
///
/// No real player may use this id; the lobby layer guarantees it.
pub const SERVER_ACTOR: &str = "server";

/// Permission role for event handling.
///
/// These serialize to the exact lowercase tokens accepted in configuration
/// documents; any other token is a deserialization error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The player who created the game instance.
    Host,
    /// Any other roster member.
    Player,
    /// The engine itself (timer expiry and other synthesized events).
    Server,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Host => write!(f, "host"),
            Role::Player => write!(f, "player"),
            Role::Server => write!(f, "server"),
        }
    }
}

/// A connected player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identity, unique within a game instance.
    pub id: String,
    /// Display name.
    pub nickname: String,
    /// Optional avatar reference (opaque to the engine).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Player {
    /// Create a player with just an id and nickname.
    pub fn new(id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nickname: nickname.into(),
            avatar: None,
        }
    }

    /// Set the avatar (builder pattern).
    #[must_use]
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// The player roster for one game instance, plus the host designation.
///
/// Ownership note: the roster holds display identities only. Per-player
/// mutable game data lives in `GameState::player_attributes`, keyed by
/// player id, a weak back-reference rather than an ownership relation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Roster {
    players: Vec<Player>,
    host_id: String,
}

impl Roster {
    /// Create a roster. The host does not need to appear in `players`
    /// (some lobbies treat the host as a non-playing moderator).
    pub fn new(players: Vec<Player>, host_id: impl Into<String>) -> Self {
        Self {
            players,
            host_id: host_id.into(),
        }
    }

    /// All roster members in join order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// The configured host id.
    #[must_use]
    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    /// Number of roster members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Look up a player by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Resolve an actor id to its permission role.
    ///
    /// Returns `None` for ids that are neither the host, a roster member,
    /// nor the reserved server actor; such actors hold no permissions.
    #[must_use]
    pub fn role_of(&self, actor_id: &str) -> Option<Role> {
        if actor_id == SERVER_ACTOR {
            Some(Role::Server)
        } else if actor_id == self.host_id {
            Some(Role::Host)
        } else if self.get(actor_id).is_some() {
            Some(Role::Player)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(
            vec![Player::new("p1", "Alice"), Player::new("p2", "Bob")],
            "p1",
        )
    }

    #[test]
    fn test_role_resolution() {
        let roster = roster();
        assert_eq!(roster.role_of("p1"), Some(Role::Host));
        assert_eq!(roster.role_of("p2"), Some(Role::Player));
        assert_eq!(roster.role_of(SERVER_ACTOR), Some(Role::Server));
        assert_eq!(roster.role_of("stranger"), None);
    }

    #[test]
    fn test_role_tokens_are_exact() {
        assert_eq!(serde_json::to_string(&Role::Host).unwrap(), "\"host\"");
        assert!(serde_json::from_str::<Role>("\"Host\"").is_err());
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }
}
