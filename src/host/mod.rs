//! Host-facing adapter: one damage model per player plus the callbacks back out
//!
//! The host owns the game loop. It calls into [`DamageModelStore`] when
//! something happens to a player and receives sync packets, death notices
//! and status effects through its [`HostCallbacks`] implementation.

use std::sync::Arc;

use ahash::AHashMap;
use tracing::{debug, info, warn};

use crate::core::config::DamageModelConfig;
use crate::core::error::{FirstAidError, Result};
use crate::core::types::{PlayerContext, PlayerId};
use crate::damage::debuff::EffectRequest;
use crate::damage::model::PlayerDamageModel;
use crate::damage::part::PlayerPart;
use crate::damage::source::DamageSource;
use crate::registry::{FirstAidRegistry, ItemStack};
use crate::sync::{ModelSnapshot, PartDisplay};

/// Calls from the damage core back into the host
pub trait HostCallbacks {
    /// Send the model to remote observers
    fn request_network_sync(&mut self, player: PlayerId, snapshot: &ModelSnapshot);

    /// The player's model just became dead
    fn notify_death(&mut self, player: PlayerId);

    /// Combat tracking and exhaustion, before the damage is distributed
    fn track_damage(&mut self, _player: PlayerId, _source: &DamageSource, _amount: f32) {}

    /// Apply or clear a status effect (a zero duration clears)
    fn apply_effect(&mut self, _player: PlayerId, _effect: &EffectRequest) {}
}

/// Host that ignores every callback
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl HostCallbacks for NoopHost {
    fn request_network_sync(&mut self, _player: PlayerId, _snapshot: &ModelSnapshot) {}
    fn notify_death(&mut self, _player: PlayerId) {}
}

/// Damage models keyed by player
pub struct DamageModelStore {
    models: AHashMap<PlayerId, PlayerDamageModel>,
    registry: Arc<FirstAidRegistry>,
    config: DamageModelConfig,
    /// Base seed for reproducible models; each attach advances it
    seed: Option<u64>,
    attached: u64,
}

impl DamageModelStore {
    pub fn new(config: DamageModelConfig, registry: Arc<FirstAidRegistry>) -> Self {
        Self {
            models: AHashMap::new(),
            registry,
            config,
            seed: None,
            attached: 0,
        }
    }

    /// Store whose models use seeded random generators
    pub fn with_seed(config: DamageModelConfig, registry: Arc<FirstAidRegistry>, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(config, registry)
        }
    }

    pub fn registry(&self) -> &FirstAidRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DamageModelConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Give a player a fresh model; an already attached player keeps theirs
    pub fn attach(&mut self, player: PlayerId) -> &mut PlayerDamageModel {
        let Self {
            models,
            registry,
            config,
            seed,
            attached,
        } = self;

        models.entry(player).or_insert_with(|| {
            debug!("Attaching damage model to {:?}", player);
            let model = match *seed {
                Some(seed) => PlayerDamageModel::with_seed(
                    config,
                    registry.as_ref(),
                    seed.wrapping_add(*attached),
                ),
                None => PlayerDamageModel::new(config, registry.as_ref()),
            };
            *attached += 1;
            model
        })
    }

    pub fn detach(&mut self, player: PlayerId) -> Option<PlayerDamageModel> {
        self.models.remove(&player)
    }

    pub fn model(&self, player: PlayerId) -> Option<&PlayerDamageModel> {
        self.models.get(&player)
    }

    pub fn model_mut(&mut self, player: PlayerId) -> Option<&mut PlayerDamageModel> {
        self.models.get_mut(&player)
    }

    fn require(&mut self, player: PlayerId) -> Result<&mut PlayerDamageModel> {
        self.models
            .get_mut(&player)
            .ok_or(FirstAidError::UnknownPlayer(player))
    }

    /// Handle incoming damage; returns how much of `raw` was consumed
    ///
    /// Consumed is what the shield soaked plus the health removed from parts,
    /// so only damage that found no living part is left unconsumed.
    pub fn on_damage(
        &mut self,
        player: PlayerId,
        ctx: &PlayerContext,
        source: &DamageSource,
        raw: f32,
        host: &mut impl HostCallbacks,
    ) -> Result<f32> {
        let distribution = self.registry.resolve_distribution(source);
        let model = self.require(player)?;

        if raw.is_nan() || raw <= 0.0 {
            return Ok(0.0);
        }

        let shield = model.absorption();
        let amount = if distribution.bypasses_absorption() {
            raw
        } else {
            model.absorb_damage(raw)
        };
        let soaked = shield - model.absorption();

        if amount > 0.0 {
            host.track_damage(player, source, amount);
        }

        let outcome = model.apply_damage(amount, &distribution, ctx.morphine_active);
        for effect in &outcome.effects {
            host.apply_effect(player, effect);
        }

        if model.take_death_transition(Some(ctx)) {
            host.notify_death(player);
        }

        Ok(soaked + outcome.applied)
    }

    /// Advance one player by a tick
    pub fn on_tick(
        &mut self,
        player: PlayerId,
        ctx: &PlayerContext,
        host: &mut impl HostCallbacks,
    ) -> Result<()> {
        let model = self.require(player)?;
        if ctx.creative {
            return Ok(());
        }

        let outcome = model.tick(ctx);
        for effect in &outcome.effects {
            host.apply_effect(player, effect);
        }
        if outcome.died {
            host.notify_death(player);
        }
        if let Some(snapshot) = &outcome.sync {
            host.request_network_sync(player, snapshot);
        }
        Ok(())
    }

    /// Generic healing from outside the healing items (potions, food)
    ///
    /// Returns false when other healing sources are disabled by config.
    pub fn on_heal(
        &mut self,
        player: PlayerId,
        amount: f32,
        target: Option<PlayerPart>,
    ) -> Result<bool> {
        let allowed = self.config.allow_other_healing_items;
        let model = self.require(player)?;
        if !allowed {
            debug!("Ignoring {:.2} generic healing for {:?}", amount, player);
            return Ok(false);
        }
        model.heal(amount, target);
        Ok(true)
    }

    /// Start a registered healing item on a part
    ///
    /// Returns false, touching nothing, when the item has no healer.
    pub fn use_healing_item(
        &mut self,
        player: PlayerId,
        stack: &ItemStack,
        part: PlayerPart,
    ) -> Result<bool> {
        let Some(healer) = self.registry.part_healer(stack) else {
            debug!("{} is not a healing item", stack.item);
            return Ok(false);
        };
        self.require(player)?.apply_healer(part, healer);
        Ok(true)
    }

    pub fn on_revive(&mut self, player: PlayerId) -> Result<()> {
        self.require(player)?.revive_player();
        Ok(())
    }

    /// The host killed the player; the model is reset, not dropped
    pub fn on_death(&mut self, player: PlayerId) -> Result<()> {
        self.require(player)?.reset();
        Ok(())
    }

    /// Swap in new thresholds for every attached model
    pub fn on_config_reload(&mut self, config: DamageModelConfig) -> Result<()> {
        config.validate()?;
        for model in self.models.values_mut() {
            model.apply_config(&config);
        }
        info!("Reloaded damage config for {} players", self.models.len());
        self.config = config;
        Ok(())
    }

    pub fn read_display_state(&self, player: PlayerId) -> Option<[PartDisplay; PlayerPart::COUNT]> {
        self.model(player).map(PlayerDamageModel::display_state)
    }

    /// Serialized model for saving with the player
    pub fn persist(&self, player: PlayerId) -> Result<String> {
        let model = self
            .model(player)
            .ok_or(FirstAidError::UnknownPlayer(player))?;
        ModelSnapshot::persisted(model).to_json()
    }

    /// Load saved data into an attached player's model
    pub fn restore(&mut self, player: PlayerId, json: &str) -> Result<()> {
        let snapshot = match ModelSnapshot::from_json(json) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Discarding saved damage model for {:?}: {}", player, e);
                return Err(e);
            }
        };
        snapshot.apply_to(self.require(player)?)
    }
}
