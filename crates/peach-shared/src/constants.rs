/// Likes ("ripens") a free-tier user may record per calendar day
pub const DEFAULT_DAILY_LIKE_LIMIT: u32 = 25;

/// Allowance reported for premium users, who are never limited
pub const PREMIUM_ALLOWANCE_SENTINEL: u32 = 999;

/// Length of a granted premium subscription in days
pub const DEFAULT_PREMIUM_DAYS: i64 = 30;

/// Separator between the two sorted user ids of a channel id
pub const CHANNEL_ID_SEPARATOR: char = '_';

/// Compatibility score weights and caps
pub const SCORE_FUN_PER_TAG: u32 = 7;
pub const SCORE_FUN_CAP: u32 = 20;
pub const SCORE_MEDIA_PER_TAG: u32 = 7;
pub const SCORE_MEDIA_CAP: u32 = 20;
pub const SCORE_VALUES_PER_TAG: u32 = 10;
pub const SCORE_VALUES_CAP: u32 = 30;
pub const SCORE_SAME_BASE: u32 = 20;
pub const SCORE_SAME_LOOKING_FOR: u32 = 10;
pub const SCORE_MAX: u32 = 100;
