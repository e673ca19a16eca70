//! The per-player damage model: eight parts plus shield, timers and flags
//!
//! The model's status (alive / critical / dead) is never stored; it is
//! recomputed from the parts every time it is asked for.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::core::config::DamageModelConfig;
use crate::core::types::{PlayerContext, VANILLA_MAX_HEALTH};
use crate::damage::constants::{HEALTH_EPSILON, MIN_SCALE_FACTOR};
use crate::damage::debuff::{Debuff, DebuffSlot, EffectRequest};
use crate::damage::distribution::{distribute_with_fallback, DamageDistribution};
use crate::damage::healer::PartHealer;
use crate::damage::part::{DamageablePart, PlayerPart};
use crate::registry::FirstAidRegistry;
use crate::sync::ModelSnapshot;

/// Aggregate status of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelStatus {
    Alive,
    /// At least one part is critical
    Critical,
    Dead,
}

/// Gameplay penalties derived from critical parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Penalties {
    /// Critical legs and feet (0 to 4)
    pub movement: u8,
    /// Critical arms (0 to 2)
    pub attack: u8,
}

/// Result of one damage event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DamageOutcome {
    /// Health removed from parts
    pub applied: f32,
    /// Damage that found no part with health left
    pub leftover: f32,
    /// Effects requested by on-hit debuffs
    pub effects: Vec<EffectRequest>,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickOutcome {
    /// Effects requested by debuffs this tick
    pub effects: Vec<EffectRequest>,
    /// Set when a resync was pending; send it to remote observers
    pub sync: Option<ModelSnapshot>,
    /// The model became dead this tick
    pub died: bool,
}

/// Damage model of one player
#[derive(Debug)]
pub struct PlayerDamageModel {
    parts: [DamageablePart; PlayerPart::COUNT],
    absorption: f32,
    /// Legacy pain suppression timer, superseded by the status effect flag
    morphine_ticks: u32,
    pub has_tutorial: bool,
    needs_resync: bool,
    death_notified: bool,
    /// Max health attribute the parts were last scaled for
    last_scale_attribute: Option<f32>,
    debuffs: [Vec<Box<dyn Debuff>>; DebuffSlot::COUNT],
    config: DamageModelConfig,
    rng: ChaCha8Rng,
}

impl PlayerDamageModel {
    /// New model at full health, random generator seeded from entropy
    pub fn new(config: &DamageModelConfig, registry: &FirstAidRegistry) -> Self {
        Self::with_rng(config, registry, ChaCha8Rng::from_entropy())
    }

    /// New model with a reproducible random generator
    pub fn with_seed(config: &DamageModelConfig, registry: &FirstAidRegistry, seed: u64) -> Self {
        Self::with_rng(config, registry, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: &DamageModelConfig, registry: &FirstAidRegistry, rng: ChaCha8Rng) -> Self {
        let parts = PlayerPart::all().map(|part| {
            let base = config.base_max_health(part);
            DamageablePart::new(
                part,
                base,
                base * config.max_health_scale_cap,
                config.can_cause_death(part),
                config.critical_threshold,
            )
        });
        let debuffs = DebuffSlot::all().map(|slot| registry.debuffs(slot));

        Self {
            parts,
            absorption: 0.0,
            morphine_ticks: 0,
            has_tutorial: false,
            needs_resync: true,
            death_notified: false,
            last_scale_attribute: None,
            debuffs,
            config: config.clone(),
            rng,
        }
    }

    // === PART ACCESS ===

    pub fn part(&self, part: PlayerPart) -> &DamageablePart {
        &self.parts[part.index()]
    }

    pub fn part_mut(&mut self, part: PlayerPart) -> &mut DamageablePart {
        &mut self.parts[part.index()]
    }

    /// Parts in slot order
    pub fn iter(&self) -> impl Iterator<Item = &DamageablePart> {
        self.parts.iter()
    }

    /// Run `action` on every part in slot order
    pub fn for_each(&self, action: impl FnMut(&DamageablePart)) {
        self.parts.iter().for_each(action);
    }

    /// Run `action` on every part in slot order, allowing mutation
    pub fn for_each_mut(&mut self, action: impl FnMut(&mut DamageablePart)) {
        self.parts.iter_mut().for_each(action);
        self.schedule_resync();
    }

    pub(crate) fn parts_and_rng_mut(
        &mut self,
    ) -> (&mut [DamageablePart; PlayerPart::COUNT], &mut ChaCha8Rng) {
        (&mut self.parts, &mut self.rng)
    }

    pub fn config(&self) -> &DamageModelConfig {
        &self.config
    }

    // === STATUS ===

    /// Head, body, or the whole lower body at zero
    ///
    /// With a context, a pending revival keeps the player alive.
    pub fn is_dead(&self, player: Option<&PlayerContext>) -> bool {
        if player.is_some_and(|ctx| ctx.revival_pending) {
            return false;
        }

        let fatal_part = self
            .parts
            .iter()
            .any(|p| p.can_cause_death() && p.is_at_zero());
        let lower_body_gone = self
            .parts
            .iter()
            .filter(|p| p.part().is_lower_body())
            .all(|p| p.is_at_zero());

        fatal_part || lower_body_gone
    }

    pub fn has_no_critical(&self) -> bool {
        !self.parts.iter().any(|p| p.is_critical())
    }

    pub fn status(&self, player: Option<&PlayerContext>) -> ModelStatus {
        if self.is_dead(player) {
            ModelStatus::Dead
        } else if !self.has_no_critical() {
            ModelStatus::Critical
        } else {
            ModelStatus::Alive
        }
    }

    /// Sum of every part's current max health, rounded
    pub fn current_max_health(&self) -> i32 {
        self.parts.iter().map(|p| p.max_health()).sum::<f32>().round() as i32
    }

    /// Sum of every part's current health
    pub fn total_health(&self) -> f32 {
        self.parts.iter().map(|p| p.current_health()).sum()
    }

    pub fn penalties(&self) -> Penalties {
        let count = |f: fn(PlayerPart) -> bool| {
            self.parts
                .iter()
                .filter(|p| f(p.part()) && p.is_critical())
                .count() as u8
        };
        Penalties {
            movement: count(PlayerPart::is_lower_body),
            attack: count(PlayerPart::is_arm),
        }
    }

    /// Health repairs performed by all parts; non-zero means a bug upstream
    pub fn invariant_repairs(&self) -> u32 {
        self.parts.iter().map(|p| p.invariant_repairs()).sum()
    }

    /// Health fraction of a debuff slot
    pub fn slot_health_fraction(&self, slot: DebuffSlot) -> f32 {
        let (current, max) = slot.parts().iter().fold((0.0, 0.0), |(c, m), part| {
            let p = self.part(*part);
            (c + p.current_health(), m + p.max_health())
        });
        if max <= 0.0 {
            0.0
        } else {
            current / max
        }
    }

    // === ABSORPTION ===

    pub fn absorption(&self) -> f32 {
        self.absorption
    }

    pub fn set_absorption(&mut self, absorption: f32) {
        self.absorption = if absorption.is_finite() { absorption.max(0.0) } else { 0.0 };
        self.schedule_resync();
    }

    /// Soak up what the shield can; returns the damage still to be dealt
    pub fn absorb_damage(&mut self, amount: f32) -> f32 {
        if amount.is_nan() || amount <= 0.0 {
            return 0.0;
        }
        let soaked = amount.min(self.absorption);
        let remaining = amount - soaked;
        if soaked > 0.0 {
            self.absorption -= soaked;
            self.schedule_resync();
        }
        remaining
    }

    // === DAMAGE AND HEALING ===

    /// Deal `amount` with `distribution`, then randomly place any leftover
    ///
    /// Absorption is not consulted here; callers run [`absorb_damage`]
    /// first unless the distribution bypasses it.
    ///
    /// [`absorb_damage`]: PlayerDamageModel::absorb_damage
    pub fn apply_damage(
        &mut self,
        amount: f32,
        distribution: &DamageDistribution,
        suppress_debuffs: bool,
    ) -> DamageOutcome {
        if amount.is_nan() || amount <= 0.0 {
            return DamageOutcome::default();
        }

        let before = self.slot_health();
        let leftover = distribute_with_fallback(distribution, amount, self);
        let after = self.slot_health();

        let mut effects = Vec::new();
        if !suppress_debuffs && !self.pain_suppressed() {
            for slot in DebuffSlot::all() {
                let taken = before[slot.index()] - after[slot.index()];
                if taken <= HEALTH_EPSILON {
                    continue;
                }
                let fraction = self.slot_health_fraction(slot);
                effects.extend(
                    self.debuffs[slot.index()]
                        .iter_mut()
                        .filter_map(|d| d.handle_damage_taken(taken, fraction)),
                );
            }
        }

        if self.config.debug {
            debug!(
                "{} damage {:.3}: leftover {:.3}, status {:?}",
                distribution.name(),
                amount,
                leftover,
                self.status(None)
            );
        }

        self.schedule_resync();
        DamageOutcome {
            applied: before.iter().sum::<f32>() - after.iter().sum::<f32>(),
            leftover,
            effects,
        }
    }

    /// Heal one part, or split evenly across all eight when no target is given
    pub fn heal(&mut self, amount: f32, target: Option<PlayerPart>) {
        if amount.is_nan() || amount <= 0.0 {
            return;
        }
        match target {
            Some(part) => self.part_mut(part).heal(amount),
            None => {
                let share = amount / PlayerPart::COUNT as f32;
                self.parts.iter_mut().for_each(|p| p.heal(share));
            }
        }
        self.schedule_resync();
    }

    /// Start a healing item on a part
    pub fn apply_healer(&mut self, part: PlayerPart, healer: PartHealer) {
        self.part_mut(part).apply_healer(healer);
        self.schedule_resync();
    }

    /// Restore a share of max health to every part after sleeping
    pub fn sleep_heal(&mut self) {
        let fraction = self.config.sleep_heal_fraction;
        self.parts
            .iter_mut()
            .for_each(|p| p.heal(p.max_health() * fraction));
        self.schedule_resync();
    }

    // === LIFECYCLE ===

    /// Everything back to full; safe to call on a model that is not dead
    pub fn revive_player(&mut self) {
        self.parts.iter_mut().for_each(DamageablePart::reset);
        self.absorption = 0.0;
        self.death_notified = false;
        info!("Damage model revived ({} max health)", self.current_max_health());
        self.schedule_resync();
    }

    /// Clear after death: full health, no timers
    pub fn reset(&mut self) {
        self.revive_player();
        self.morphine_ticks = 0;
    }

    /// Rescale max health from the player's max health attribute
    ///
    /// Current health keeps its ratio to max health. A non-finite attribute
    /// leaves the current scale in place.
    pub fn run_scale_logic(&mut self, player: &PlayerContext) {
        let attribute = player.max_health_attribute;
        if !attribute.is_finite() {
            debug!("Ignoring max health attribute {}", attribute);
            return;
        }

        let factor = if self.config.scale_max_health {
            (attribute / VANILLA_MAX_HEALTH).max(MIN_SCALE_FACTOR)
        } else {
            1.0
        };

        for p in self.parts.iter_mut() {
            let base = self.config.base_max_health(p.part());
            p.set_absolute_max_health(base * self.config.max_health_scale_cap);
            let target = base * factor;
            if (p.max_health() - target).abs() > HEALTH_EPSILON {
                p.set_max_health(target);
            }
        }

        self.last_scale_attribute = Some(attribute);
        self.schedule_resync();
    }

    /// Take a new config: thresholds, death flags and scale limits
    ///
    /// Scaling is redone on the next tick.
    pub fn apply_config(&mut self, config: &DamageModelConfig) {
        self.config = config.clone();
        for p in self.parts.iter_mut() {
            let part = p.part();
            p.set_critical_threshold(config.critical_threshold);
            p.set_can_cause_death(config.can_cause_death(part));
        }
        self.last_scale_attribute = None;
        self.schedule_resync();
    }

    /// Start the legacy morphine timer with a random duration
    #[deprecated(note = "pain suppression is a status effect; set PlayerContext::morphine_active")]
    pub fn apply_morphine(&mut self) {
        let (min, max) = (self.config.morphine_min_ticks, self.config.morphine_max_ticks);
        // Models can be built from configs that never went through validate
        self.morphine_ticks = self.rng.gen_range(min.min(max)..=min.max(max));
        debug!("Morphine active for {} ticks", self.morphine_ticks);
    }

    pub fn morphine_ticks(&self) -> u32 {
        self.morphine_ticks
    }

    fn pain_suppressed(&self) -> bool {
        self.morphine_ticks > 0
    }

    /// Advance one game tick
    pub fn tick(&mut self, player: &PlayerContext) -> TickOutcome {
        self.morphine_ticks = self.morphine_ticks.saturating_sub(1);

        if self.last_scale_attribute != Some(player.max_health_attribute) {
            self.run_scale_logic(player);
        }

        let regen_allowed = self.config.passive_regen_enabled
            && player.food_level >= self.config.regen_min_food_level
            && !self.is_dead(Some(player));
        let regen = self.config.passive_regen_per_tick;

        let mut healed = false;
        for p in self.parts.iter_mut() {
            healed |= p.tick(regen_allowed, regen);
        }
        if healed {
            self.schedule_resync();
        }

        let mut effects = Vec::new();
        if !self.pain_suppressed() && !player.morphine_active {
            for slot in DebuffSlot::all() {
                let fraction = self.slot_health_fraction(slot);
                effects.extend(
                    self.debuffs[slot.index()]
                        .iter_mut()
                        .filter_map(|d| d.update(fraction)),
                );
            }
        }

        let died = self.take_death_transition(Some(player));
        let sync = self.needs_resync.then(|| ModelSnapshot::sync(self));
        self.needs_resync = false;

        TickOutcome { effects, sync, died }
    }

    /// True exactly once per death, until the model is revived
    pub fn take_death_transition(&mut self, player: Option<&PlayerContext>) -> bool {
        if self.death_notified || !self.is_dead(player) {
            return false;
        }
        self.death_notified = true;
        info!("Damage model died");
        true
    }

    // === SYNC ===

    /// Mark dirty; the next tick emits one sync for all changes so far
    pub fn schedule_resync(&mut self) {
        self.needs_resync = true;
    }

    pub fn needs_resync(&self) -> bool {
        self.needs_resync
    }

    /// Forget the scale attribute so the next tick rescales
    pub(crate) fn invalidate_scale(&mut self) {
        self.last_scale_attribute = None;
    }

    fn slot_health(&self) -> [f32; DebuffSlot::COUNT] {
        DebuffSlot::all().map(|slot| {
            slot.parts()
                .iter()
                .map(|p| self.part(*p).current_health())
                .sum()
        })
    }
}
