//! Damage system constants
//!
//! Tunables that are not exposed through the config file.

/// Health at or below this is treated as zero
pub const HEALTH_EPSILON: f32 = 1e-4;

/// Amount each healing-item step restores
pub const HEAL_PER_STEP: f32 = 1.0;

/// Lowest max health scale, one vanilla health point out of twenty
pub const MIN_SCALE_FACTOR: f32 = 0.05;

// Random distribution
/// Remaining amounts at or below this are placed on one part in full
pub const RANDOM_MIN_CHUNK: f32 = 1.0;
/// Smallest share of the remaining amount a random pick takes
pub const RANDOM_MIN_FRACTION: f32 = 0.25;
/// After this many picks the rest goes in whole chunks
pub const RANDOM_MAX_PICKS: usize = 32;

// Constant debuffs
/// Duration of effects requested by constant debuffs
pub const CONSTANT_EFFECT_TICKS: u32 = 200;
/// Ticks between refreshes of an active constant effect
pub const CONSTANT_EFFECT_REFRESH_TICKS: u32 = 160;
