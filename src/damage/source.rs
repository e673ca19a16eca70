//! Description of where a hit came from, as reported by the host

use serde::{Deserialize, Serialize};

/// Well-known damage type keys
pub mod damage_types {
    pub const FALL: &str = "fall";
    pub const HOT_FLOOR: &str = "hot_floor";
    pub const FALLING_BLOCK: &str = "falling_block";
    pub const ANVIL: &str = "anvil";
    pub const FALLING_STALACTITE: &str = "falling_stalactite";
    pub const STARVE: &str = "starve";
    pub const DROWN: &str = "drown";
    pub const MOB_ATTACK: &str = "mob_attack";
}

/// A damage source: its registered type key plus free-form tags
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageSource {
    /// Registered damage type key; `None` for sources the host never registered
    pub damage_type: Option<String>,
    /// Category tags such as "projectile" or "explosion"
    #[serde(default)]
    pub tags: Vec<String>,
    /// Hunger exhaustion caused by taking this hit
    #[serde(default)]
    pub exhaustion: f32,
}

impl DamageSource {
    pub fn new(damage_type: impl Into<String>) -> Self {
        Self {
            damage_type: Some(damage_type.into()),
            tags: Vec::new(),
            exhaustion: 0.1,
        }
    }

    /// A source without a registered type key
    pub fn untyped() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_exhaustion(mut self, exhaustion: f32) -> Self {
        self.exhaustion = exhaustion;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn type_key(&self) -> Option<&str> {
        self.damage_type.as_deref()
    }
}
