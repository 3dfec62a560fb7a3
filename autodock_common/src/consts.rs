//! Default thresholds, timings and maneuver magnitudes.
//!
//! These are the values the autocharge behavior was tuned with. Every one of
//! them can be overridden from the TOML configuration.

use static_assertions::const_assert;

// ─── Ground sensor ──────────────────────────────────────────────────

/// Number of downward reflectance channels.
pub const GROUND_CHANNELS: usize = 5;

/// Reflectance below this value means the channel sees the dark guide line.
pub const GROUND_LINE_THRESHOLD: u16 = 550;

/// Reflectance above this value on the outer channels means off the line.
pub const GROUND_OFF_LINE_THRESHOLD: u16 = 900;

/// Topic carrying one ground reading per tick.
pub const GROUND_TOPIC: &str = "/ground";

// ─── Vision ─────────────────────────────────────────────────────────

/// Brightness above which the dock's charge indicator is considered lit.
pub const CONTACT_MADE_BRIGHTNESS: u8 = 180;

/// Brightness below which charging contact is considered lost.
pub const CONTACT_LOST_BRIGHTNESS: u8 = 170;

const_assert!(CONTACT_LOST_BRIGHTNESS < CONTACT_MADE_BRIGHTNESS);
const_assert!(GROUND_LINE_THRESHOLD < GROUND_OFF_LINE_THRESHOLD);

// ─── Debounce ───────────────────────────────────────────────────────

/// A debounced condition fires once its counter exceeds this value.
pub const DEBOUNCE_COUNT: u16 = 10;

/// Grace period sentinel loaded into `out_of_line` when the line is lost.
pub const OUT_OF_LINE_SENTINEL: u32 = 10_000;

// ─── Timing [s] ─────────────────────────────────────────────────────

/// Time spent wandering before looking for the guide line.
pub const EXPLORE_DURATION_S: u16 = 15;

/// Explore bookkeeping period.
pub const EXPLORE_BOOKKEEPING_PERIOD_S: u16 = 5;

/// SearchLine gives up after this long.
pub const SEARCH_TIMEOUT_S: u16 = 20;

/// FollowLine presumes the robot is stuck after this long.
pub const FOLLOW_STUCK_S: u16 = 10;

/// Charging duration before disengaging.
pub const CHARGE_DURATION_S: u16 = 30;

/// Escape attempts within one FollowLine sojourn before aborting.
pub const MAX_ESCAPE_ATTEMPTS: u8 = 3;

/// Period of the elapsed-seconds source.
pub const TIMEBASE_PERIOD_MS: u64 = 1000;

/// The elapsed-seconds counter wraps to zero when it reaches this value.
pub const TIMEBASE_WRAP: u16 = 0xFFFF;

// ─── Motion [encoder ticks, ticks/s] ────────────────────────────────

/// Hard pivot wheel speed and the centered cruise ceiling.
pub const TURN_SPEED: i16 = 300;

/// Lower clamp of the pending line-follow speed.
pub const FOLLOW_SPEED_MIN: i16 = 100;

/// Upper clamp of the pending line-follow speed.
pub const FOLLOW_SPEED_MAX: i16 = 300;

/// Pending speed after a proportional turn is `FOLLOW_SPEED_BASE - channel`.
pub const FOLLOW_SPEED_BASE: u16 = 1024;

/// Wheel speed of the escape pivot.
pub const ESCAPE_SPEED: i16 = 150;

/// Distance of each half of the escape pivot.
pub const ESCAPE_TICKS: i32 = 75;

/// Wheel speed of the reverse and disengage maneuvers.
pub const REVERSE_SPEED: i16 = 300;

/// Distance of the reverse maneuver.
pub const REVERSE_TICKS: i32 = 250;

/// Distance of the single-wheel pivot that follows a disengage reverse.
pub const DISENGAGE_PIVOT_TICKS: i32 = 250;

/// Interval between encoder polls while a blocking maneuver runs.
pub const MANEUVER_POLL_MS: u64 = 2;

// ─── Obstacle avoidance ─────────────────────────────────────────────

/// Proximity threshold handed to the avoidance behavior while exploring.
pub const AVOIDANCE_THRESHOLD: u16 = 700;
