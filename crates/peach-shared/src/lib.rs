//! # peach-shared
//!
//! Storage-independent building blocks for Peach: typed identifiers, profile
//! records, the compatibility scorer, the daily quota tracker and the clock
//! abstraction the engine reads "today" from.

pub mod clock;
pub mod constants;
pub mod error;
pub mod profile;
pub mod quota;
pub mod score;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::IdError;
pub use profile::{Basics, Life, Profile, Relationships, Work};
pub use quota::{Allowance, QuotaPolicy, QuotaState};
pub use score::compatibility;
pub use types::{ChannelId, UserId, UserPair};
