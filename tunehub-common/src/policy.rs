//! Access-control policy: roles and ownership checks
//!
//! All permission decisions go through this module so handlers never
//! compare role strings directly. Checks return `Error::Forbidden` on
//! violation, which the web layer maps to HTTP 403.

use crate::db::songs::Song;
use crate::db::users::User;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// User role, stored as lowercase text in the `users` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default role: browse, rate, build playlists
    Listener,
    /// May upload and manage songs and albums
    Creator,
    /// May view aggregate statistics and delete any song or account
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Listener => "listener",
            Role::Creator => "creator",
            Role::Admin => "admin",
        }
    }

    /// Parse a role from storage or form input
    ///
    /// Accepts "user" as an alias for listener (legacy form value).
    pub fn parse(s: &str) -> Result<Role> {
        match s {
            "listener" | "user" => Ok(Role::Listener),
            "creator" => Ok(Role::Creator),
            "admin" => Ok(Role::Admin),
            other => Err(Error::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Require an exact role for a route
pub fn require_role(user: &User, role: Role) -> Result<()> {
    if user.role == role {
        Ok(())
    } else {
        Err(Error::Forbidden(format!(
            "This page requires the {} role",
            role
        )))
    }
}

/// Require any of the given roles
pub fn require_any_role(user: &User, roles: &[Role]) -> Result<()> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "You don't have permission to access this page".to_string(),
        ))
    }
}

/// Only the uploading creator may edit a song
pub fn ensure_song_owner(user: &User, song: &Song) -> Result<()> {
    if song.user_id == user.id {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "You don't have permission to modify this song".to_string(),
        ))
    }
}

/// The uploading creator or an admin may delete a song
pub fn ensure_song_manager(user: &User, song: &Song) -> Result<()> {
    if user.role == Role::Admin || song.user_id == user.id {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "You don't have permission to delete this song".to_string(),
        ))
    }
}

/// Playlists and albums may only be changed by their owner
pub fn ensure_owner(user: &User, owner_id: i64) -> Result<()> {
    if user.id == owner_id {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "You don't have permission to modify this collection".to_string(),
        ))
    }
}
