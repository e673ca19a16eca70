//! Registry of damage distributions, healing items and debuffs
//!
//! Built once at startup through [`RegistryBuilder`], then immutable. Pass
//! it (usually behind an `Arc`) to whatever needs lookups.

pub mod bindings;

use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::damage::debuff::{ConstantDebuff, Debuff, DebuffSlot, EffectKind, OnHitDebuff};
use crate::damage::distribution::DamageDistribution;
use crate::damage::healer::PartHealer;
use crate::damage::source::{damage_types, DamageSource};

pub use bindings::{HealerBinding, RegistryConfig, SourceMatcher};

/// A stack of items as the host sees it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }

    pub fn single(item: impl Into<String>) -> Self {
        Self::new(item, 1)
    }
}

pub type SourcePredicate = Box<dyn Fn(&DamageSource) -> bool + Send + Sync>;
pub type HealerFactory = Box<dyn Fn(&ItemStack) -> PartHealer + Send + Sync>;
pub type HealingTimeFactory = Box<dyn Fn(&ItemStack) -> u32 + Send + Sync>;
pub type DebuffFactory = Box<dyn Fn() -> Box<dyn Debuff> + Send + Sync>;

struct HealerEntry {
    healer: HealerFactory,
    healing_time: HealingTimeFactory,
}

/// Collects registrations before freezing them into a [`FirstAidRegistry`]
#[derive(Default)]
pub struct RegistryBuilder {
    dynamic: Vec<(SourcePredicate, DamageDistribution)>,
    statics: AHashMap<String, DamageDistribution>,
    healers: AHashMap<String, HealerEntry>,
    debuffs: AHashMap<DebuffSlot, Vec<DebuffFactory>>,
    debug: bool,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a readout of the bindings when built
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Exact binding for a damage type key; later bindings replace earlier ones
    pub fn bind_damage_type(
        mut self,
        damage_type: impl Into<String>,
        distribution: DamageDistribution,
    ) -> Self {
        self.statics.insert(damage_type.into(), distribution);
        self
    }

    /// Predicate binding, checked in registration order after exact bindings
    pub fn bind_dynamic(
        mut self,
        predicate: impl Fn(&DamageSource) -> bool + Send + Sync + 'static,
        distribution: DamageDistribution,
    ) -> Self {
        self.dynamic.push((Box::new(predicate), distribution));
        self
    }

    pub fn register_healer(
        mut self,
        item: impl Into<String>,
        healer: impl Fn(&ItemStack) -> PartHealer + Send + Sync + 'static,
        healing_time: impl Fn(&ItemStack) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.healers.insert(
            item.into(),
            HealerEntry {
                healer: Box::new(healer),
                healing_time: Box::new(healing_time),
            },
        );
        self
    }

    pub fn register_debuff(
        mut self,
        slot: DebuffSlot,
        factory: impl Fn() -> Box<dyn Debuff> + Send + Sync + 'static,
    ) -> Self {
        self.debuffs.entry(slot).or_default().push(Box::new(factory));
        self
    }

    /// Stock bindings: fall/head/starve damage types, bandage and plaster,
    /// and one set of debuffs per slot
    pub fn with_defaults(self) -> Self {
        self.bind_damage_type(damage_types::FALL, DamageDistribution::Fall)
            .bind_damage_type(damage_types::HOT_FLOOR, DamageDistribution::Fall)
            .bind_damage_type(damage_types::FALLING_BLOCK, DamageDistribution::Head)
            .bind_damage_type(damage_types::ANVIL, DamageDistribution::Head)
            .bind_damage_type(damage_types::FALLING_STALACTITE, DamageDistribution::Head)
            .bind_damage_type(damage_types::STARVE, DamageDistribution::Starve)
            .register_healer("bandage", |_| PartHealer::bandage(), |_| 50)
            .register_healer("plaster", |_| PartHealer::plaster(), |_| 60)
            .register_debuff(DebuffSlot::Head, || {
                Box::new(OnHitDebuff::new(EffectKind::Blindness, vec![(2.0, 40), (1.0, 20)]))
            })
            .register_debuff(DebuffSlot::Head, || {
                Box::new(OnHitDebuff::new(EffectKind::Nausea, vec![(3.0, 100), (2.0, 50)]))
            })
            .register_debuff(DebuffSlot::Body, || {
                Box::new(OnHitDebuff::new(EffectKind::Nausea, vec![(4.0, 120), (2.0, 60)]))
            })
            .register_debuff(DebuffSlot::Body, || {
                Box::new(ConstantDebuff::new(EffectKind::Weakness, vec![(0.25, 1), (0.5, 0)]))
            })
            .register_debuff(DebuffSlot::Arms, || {
                Box::new(ConstantDebuff::new(
                    EffectKind::MiningFatigue,
                    vec![(0.25, 1), (0.5, 0)],
                ))
            })
            .register_debuff(DebuffSlot::LegsAndFeet, || {
                Box::new(ConstantDebuff::new(EffectKind::Slowness, vec![(0.35, 1), (0.6, 0)]))
            })
    }

    pub fn build(self) -> FirstAidRegistry {
        let registry = FirstAidRegistry {
            dynamic: self.dynamic,
            statics: self.statics,
            healers: self.healers,
            debuffs: self.debuffs,
        };
        if self.debug {
            registry.log_readout();
        }
        registry
    }
}

/// Immutable lookup tables consulted by the damage models
pub struct FirstAidRegistry {
    dynamic: Vec<(SourcePredicate, DamageDistribution)>,
    statics: AHashMap<String, DamageDistribution>,
    healers: AHashMap<String, HealerEntry>,
    debuffs: AHashMap<DebuffSlot, Vec<DebuffFactory>>,
}

impl FirstAidRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// No bindings at all: every source is random, no healers, no debuffs
    pub fn empty() -> Self {
        RegistryBuilder::new().build()
    }

    /// The stock bindings
    pub fn standard() -> Self {
        RegistryBuilder::new().with_defaults().build()
    }

    /// Distribution bound to this source, if any
    ///
    /// Exact damage type bindings win; otherwise the first matching predicate.
    pub fn distribution_for_source(&self, source: &DamageSource) -> Option<&DamageDistribution> {
        let Some(damage_type) = source.type_key() else {
            warn!("Attempted to get damage distribution for unregistered damage source");
            return None;
        };

        self.statics.get(damage_type).or_else(|| {
            self.dynamic
                .iter()
                .find(|(predicate, _)| predicate(source))
                .map(|(_, distribution)| distribution)
        })
    }

    /// Like [`distribution_for_source`], falling back to `Random`
    ///
    /// [`distribution_for_source`]: FirstAidRegistry::distribution_for_source
    pub fn resolve_distribution(&self, source: &DamageSource) -> DamageDistribution {
        match self.distribution_for_source(source) {
            Some(distribution) => distribution.clone(),
            None => {
                debug!(
                    "No distribution bound for {:?}, using random",
                    source.type_key()
                );
                DamageDistribution::Random
            }
        }
    }

    /// Fresh healer for this item, or `None` if it is not a healing item
    pub fn part_healer(&self, stack: &ItemStack) -> Option<PartHealer> {
        self.healers.get(&stack.item).map(|entry| (entry.healer)(stack))
    }

    /// Ticks it takes to apply this item
    pub fn part_healing_time(&self, stack: &ItemStack) -> Option<u32> {
        self.healers
            .get(&stack.item)
            .map(|entry| (entry.healing_time)(stack))
    }

    /// Newly built debuffs for a slot, in registration order
    pub fn debuffs(&self, slot: DebuffSlot) -> Vec<Box<dyn Debuff>> {
        self.debuffs
            .get(&slot)
            .map(|factories| factories.iter().map(|factory| factory()).collect())
            .unwrap_or_default()
    }

    pub fn static_binding_count(&self) -> usize {
        self.statics.len()
    }

    pub fn dynamic_binding_count(&self) -> usize {
        self.dynamic.len()
    }

    pub fn healer_count(&self) -> usize {
        self.healers.len()
    }

    fn log_readout(&self) {
        info!("Registry readout:");
        let mut statics: Vec<_> = self.statics.iter().collect();
        statics.sort_by(|a, b| a.0.cmp(b.0));
        for (damage_type, distribution) in statics {
            info!("{} bound to {}", damage_type, distribution.name());
        }
        info!("+{} additional dynamic distributions", self.dynamic.len());
    }
}

impl Default for FirstAidRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for FirstAidRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstAidRegistry")
            .field("statics", &self.statics)
            .field("dynamic", &self.dynamic.len())
            .field("healers", &self.healers.keys().collect::<Vec<_>>())
            .field(
                "debuffs",
                &self
                    .debuffs
                    .iter()
                    .map(|(slot, v)| (*slot, v.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
