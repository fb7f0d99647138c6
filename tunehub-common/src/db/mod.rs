//! Database layer
//!
//! Schema initialization plus one module of operations per entity.

pub mod albums;
pub mod init;
pub mod playlists;
pub mod ratings;
pub mod sessions;
pub mod songs;
pub mod users;

pub use init::init_database;
