//! Declarative registry bindings loaded from TOML
//!
//! ```toml
//! include_defaults = true
//!
//! [[static_bindings]]
//! damage_type = "drown"
//! distribution = { weighted = [{ part = "head", weight = 1.0 }, { part = "body", weight = 2.0 }] }
//!
//! [[dynamic_bindings]]
//! matcher = { tag = "explosion" }
//! distribution = "random"
//!
//! [[healers]]
//! item = "splint"
//! heals = 3
//! ticks_per_heal = 300
//! use_ticks = 40
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{FirstAidError, Result};
use crate::damage::distribution::DamageDistribution;
use crate::damage::healer::PartHealer;
use crate::damage::source::DamageSource;
use crate::registry::{FirstAidRegistry, RegistryBuilder};

/// What a dynamic binding tests on a damage source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMatcher {
    /// Source carries this tag
    Tag(String),
    /// Damage type key starts with this prefix
    TypePrefix(String),
}

impl SourceMatcher {
    pub fn matches(&self, source: &DamageSource) -> bool {
        match self {
            SourceMatcher::Tag(tag) => source.has_tag(tag),
            SourceMatcher::TypePrefix(prefix) => source
                .type_key()
                .is_some_and(|key| key.starts_with(prefix.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticBinding {
    pub damage_type: String,
    pub distribution: DamageDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicBinding {
    pub matcher: SourceMatcher,
    pub distribution: DamageDistribution,
}

/// A healing item: `heals` steps, one every `ticks_per_heal`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealerBinding {
    pub item: String,
    pub heals: u32,
    pub ticks_per_heal: u32,
    /// Ticks the player spends applying the item
    pub use_ticks: u32,
}

/// Registry bindings as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Start from the stock bindings before adding these
    pub include_defaults: bool,
    pub debug: bool,
    pub static_bindings: Vec<StaticBinding>,
    pub dynamic_bindings: Vec<DynamicBinding>,
    pub healers: Vec<HealerBinding>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_defaults: true,
            debug: false,
            static_bindings: Vec::new(),
            dynamic_bindings: Vec::new(),
            healers: Vec::new(),
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let distributions = self
            .static_bindings
            .iter()
            .map(|b| &b.distribution)
            .chain(self.dynamic_bindings.iter().map(|b| &b.distribution));

        for distribution in distributions {
            if let DamageDistribution::Weighted(targets) = distribution {
                if targets.is_empty() || targets.iter().any(|t| t.weight.is_nan() || t.weight < 0.0) {
                    return Err(FirstAidError::InvalidConfig(
                        "weighted distributions need at least one part and non-negative weights"
                            .into(),
                    ));
                }
            }
        }

        if let Some(healer) = self.healers.iter().find(|h| h.heals == 0) {
            return Err(FirstAidError::InvalidConfig(format!(
                "healer {} must heal at least once",
                healer.item
            )));
        }

        Ok(())
    }

    /// Registrations for these bindings, ready for more code-side additions
    pub fn into_builder(self) -> RegistryBuilder {
        let mut builder = RegistryBuilder::new().debug(self.debug);
        if self.include_defaults {
            builder = builder.with_defaults();
        }

        for binding in self.static_bindings {
            builder = builder.bind_damage_type(binding.damage_type, binding.distribution);
        }

        for binding in self.dynamic_bindings {
            let matcher = binding.matcher;
            builder = builder.bind_dynamic(move |source| matcher.matches(source), binding.distribution);
        }

        for healer in self.healers {
            let HealerBinding {
                item,
                heals,
                ticks_per_heal,
                use_ticks,
            } = healer;
            let name = item.clone();
            builder = builder.register_healer(
                item,
                move |_| PartHealer::new(name.clone(), heals, ticks_per_heal),
                move |_| use_ticks,
            );
        }

        builder
    }

    pub fn build(self) -> FirstAidRegistry {
        self.into_builder().build()
    }
}
