//! # peach-engine
//!
//! The match and quota engine behind Peach's discovery feed.
//!
//! [`MatchEngine`] is a stateless service over a [`peach_store::Database`]:
//! every call reads from and writes to the store, which stays the single
//! source of truth. It provides:
//! - **Ripening** (liking) with the free-tier daily quota and mutual-match
//!   detection
//! - **Chat** over deterministic two-party channels with read tracking
//! - **Discovery** ranked by compatibility score, and the admirers list
//! - **Admin** operations (ban, premium, delete, stats)
//! - A **change notifier** the UI can subscribe to instead of polling

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod telemetry;

pub use config::EngineConfig;
pub use engine::{AdmirerView, Conversation, MatchEngine, RipenResult, ScoredProfile};
pub use error::{EngineError, Result};
pub use events::{Notifier, PeachEvent};
