//! Damage model configuration with documented defaults
//!
//! All tunable numbers for the part state machine live here. The config is
//! owned by whoever owns the models and passed in by reference; reloading
//! swaps the whole struct and re-applies it to every live model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{FirstAidError, Result};
use crate::damage::part::PlayerPart;

/// Configuration for the per-part damage model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageModelConfig {
    // === PART HEALTH ===
    /// Base max health of the head
    pub head_max_health: f32,
    /// Base max health of the body (torso)
    pub body_max_health: f32,
    /// Base max health of each arm
    pub arm_max_health: f32,
    /// Base max health of each leg
    pub leg_max_health: f32,
    /// Base max health of each foot
    pub foot_max_health: f32,

    /// Upper bound for scaled max health, as a multiple of the base value
    ///
    /// A part's absolute max health is `base * max_health_scale_cap`; scaling
    /// can never push `max_health` past it.
    pub max_health_scale_cap: f32,

    /// Rescale part max health from the player's max health attribute
    ///
    /// When off, parts always use their base max health.
    pub scale_max_health: bool,

    // === CRITICAL STATE ===
    /// Fraction of max health below which a part turns critical
    ///
    /// Critical parts do not regenerate and feed movement/attack penalties.
    pub critical_threshold: f32,

    // === REGENERATION ===
    /// Passive regeneration on/off
    pub passive_regen_enabled: bool,

    /// Passive regeneration per tick, as a fraction of the part's max health
    ///
    /// At 0.0002 a 4.0 max part gains 0.0008 per tick, about one point per
    /// minute at 20 ticks per second.
    pub passive_regen_per_tick: f32,

    /// Minimum food level the player needs for passive regeneration
    pub regen_min_food_level: u32,

    /// Fraction of max health restored to every part by a full night's sleep
    pub sleep_heal_fraction: f32,

    /// Route generic (non-FirstAid) healing into the parts
    ///
    /// When false, generic heal events are swallowed.
    pub allow_other_healing_items: bool,

    // === DEATH ===
    /// Head at zero kills the player
    pub head_causes_death: bool,
    /// Body at zero kills the player
    pub body_causes_death: bool,

    // === MORPHINE ===
    /// Shortest legacy morphine duration in ticks
    pub morphine_min_ticks: u32,
    /// Longest legacy morphine duration in ticks
    pub morphine_max_ticks: u32,

    /// Log registry contents and distribution decisions
    pub debug: bool,
}

impl Default for DamageModelConfig {
    fn default() -> Self {
        Self {
            // Part health (sums to 34, a bit above vanilla's 20)
            head_max_health: 4.0,
            body_max_health: 6.0,
            arm_max_health: 4.0,
            leg_max_health: 4.0,
            foot_max_health: 4.0,
            max_health_scale_cap: 4.0,
            scale_max_health: false,

            critical_threshold: 0.2,

            // Regeneration
            passive_regen_enabled: true,
            passive_regen_per_tick: 0.0002,
            regen_min_food_level: 18,
            sleep_heal_fraction: 0.07,
            allow_other_healing_items: true,

            head_causes_death: true,
            body_causes_death: true,

            // 20 to 40 seconds
            morphine_min_ticks: 400,
            morphine_max_ticks: 800,

            debug: false,
        }
    }
}

impl DamageModelConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Config where every part has the same max health
    pub fn uniform(max_health: f32) -> Self {
        Self {
            head_max_health: max_health,
            body_max_health: max_health,
            arm_max_health: max_health,
            leg_max_health: max_health,
            foot_max_health: max_health,
            ..Self::default()
        }
    }

    /// Base (unscaled) max health for a part
    pub fn base_max_health(&self, part: PlayerPart) -> f32 {
        match part {
            PlayerPart::Head => self.head_max_health,
            PlayerPart::Body => self.body_max_health,
            PlayerPart::LeftArm | PlayerPart::RightArm => self.arm_max_health,
            PlayerPart::LeftLeg | PlayerPart::RightLeg => self.leg_max_health,
            PlayerPart::LeftFoot | PlayerPart::RightFoot => self.foot_max_health,
        }
    }

    /// Whether this part reaching zero is fatal on its own
    pub fn can_cause_death(&self, part: PlayerPart) -> bool {
        match part {
            PlayerPart::Head => self.head_causes_death,
            PlayerPart::Body => self.body_causes_death,
            _ => false,
        }
    }

    /// Parse a config from TOML; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        for part in PlayerPart::all() {
            let max = self.base_max_health(part);
            if max <= 0.0 || !max.is_finite() {
                return Err(FirstAidError::InvalidConfig(format!(
                    "max health of {:?} must be positive, got {}",
                    part, max
                )));
            }
        }

        if self.max_health_scale_cap < 1.0 {
            return Err(FirstAidError::InvalidConfig(format!(
                "max_health_scale_cap ({}) must be >= 1",
                self.max_health_scale_cap
            )));
        }

        if !(self.critical_threshold > 0.0 && self.critical_threshold < 1.0) {
            return Err(FirstAidError::InvalidConfig(format!(
                "critical_threshold ({}) must be in (0, 1)",
                self.critical_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.passive_regen_per_tick)
            || !(0.0..=1.0).contains(&self.sleep_heal_fraction)
        {
            return Err(FirstAidError::InvalidConfig(
                "regen and sleep heal fractions must be in [0, 1]".into(),
            ));
        }

        if self.morphine_min_ticks > self.morphine_max_ticks {
            return Err(FirstAidError::InvalidConfig(format!(
                "morphine_min_ticks ({}) should be <= morphine_max_ticks ({})",
                self.morphine_min_ticks, self.morphine_max_ticks
            )));
        }

        Ok(())
    }
}
