//! # peach-store
//!
//! Persistent store for Peach, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for every domain
//! model. Operations that must not interleave (recording a like with its quota
//! increment, creating a match with its channel) each run inside a single
//! `BEGIN IMMEDIATE` transaction, so several handles on the same file can be
//! used from different threads or processes.

pub mod channels;
pub mod database;
pub mod likes;
pub mod matches;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod notifications;
pub mod profiles;

mod codec;
mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
pub use rusqlite;
