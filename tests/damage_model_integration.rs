//! Damage model integration tests
//!
//! End-to-end runs through the public API: the worked scenarios for the
//! distributions and healing, a full player lifecycle through the store,
//! and snapshots going through JSON.

use std::sync::Arc;

use firstaid::damage::constants::HEALTH_EPSILON;
use firstaid::damage::debuff::{EffectKind, EffectRequest};
use firstaid::damage::source::damage_types;
use firstaid::damage::{distribute_with_fallback, ModelStatus, PartHealer};
use firstaid::registry::RegistryConfig;
use firstaid::sync::SNAPSHOT_SCHEMA_VERSION;
use firstaid::{
    DamageDistribution, DamageModelConfig, DamageModelStore, DamageSource, FirstAidError,
    FirstAidRegistry, HostCallbacks, ItemStack, ModelSnapshot, PlayerContext, PlayerDamageModel,
    PlayerId, PlayerPart,
};

fn uniform_model(seed: u64) -> PlayerDamageModel {
    PlayerDamageModel::with_seed(
        &DamageModelConfig::uniform(20.0),
        &FirstAidRegistry::empty(),
        seed,
    )
}

#[derive(Default)]
struct TestHost {
    syncs: Vec<ModelSnapshot>,
    deaths: u32,
    tracked: f32,
    effects: Vec<EffectRequest>,
}

impl HostCallbacks for TestHost {
    fn request_network_sync(&mut self, _player: PlayerId, snapshot: &ModelSnapshot) {
        self.syncs.push(snapshot.clone());
    }

    fn notify_death(&mut self, _player: PlayerId) {
        self.deaths += 1;
    }

    fn track_damage(&mut self, _player: PlayerId, _source: &DamageSource, amount: f32) {
        self.tracked += amount;
    }

    fn apply_effect(&mut self, _player: PlayerId, effect: &EffectRequest) {
        self.effects.push(*effect);
    }
}

/// Head distribution, 5.0 on a model with every part at 20.0
#[test]
fn test_head_hit_scenario() {
    let mut model = uniform_model(1);
    let outcome = model.apply_damage(5.0, &DamageDistribution::Head, false);

    assert_eq!(outcome.leftover, 0.0);
    assert_eq!(model.part(PlayerPart::Head).current_health(), 15.0);
    for part in PlayerPart::all().into_iter().filter(|p| *p != PlayerPart::Head) {
        assert_eq!(model.part(part).current_health(), 20.0);
    }
}

/// Starvation with the head already at zero: the head's share comes back as
/// leftover and the caller places it elsewhere
#[test]
fn test_starve_with_dead_head_scenario() {
    let config = DamageModelConfig {
        head_causes_death: false,
        ..DamageModelConfig::uniform(20.0)
    };
    let mut model = PlayerDamageModel::with_seed(&config, &FirstAidRegistry::empty(), 4);
    model.part_mut(PlayerPart::Head).apply_damage(20.0);

    let leftover = DamageDistribution::Starve.distribute_damage(8.0, &mut model);
    assert!((leftover - 1.0).abs() < 1e-5);
    for part in PlayerPart::all().into_iter().filter(|p| *p != PlayerPart::Head) {
        assert!((model.part(part).current_health() - 19.0).abs() < 1e-5);
    }

    let leftover = DamageDistribution::Random.distribute_damage(leftover, &mut model);
    assert_eq!(leftover, 0.0);
    assert!((model.total_health() - 132.0).abs() < 1e-3);
}

/// Untargeted heal of 8.0 with every part at half health
#[test]
fn test_generic_heal_scenario() {
    let mut model = uniform_model(1);
    model.for_each_mut(|p| {
        p.apply_damage(10.0);
    });

    model.heal(8.0, None);
    model.for_each(|p| {
        assert!((p.current_health() - 11.0).abs() < 1e-5);
        assert!(p.current_health() <= p.max_health());
    });
}

#[test]
fn test_fallback_absorbs_everything_when_capacity_allows() {
    let mut model = uniform_model(8);
    model.part_mut(PlayerPart::Head).apply_damage(20.0);

    let before = model.total_health();
    let leftover = distribute_with_fallback(&DamageDistribution::Head, 30.0, &mut model);
    assert_eq!(leftover, 0.0);
    assert!((before - model.total_health() - 30.0).abs() < 1e-3);
}

#[test]
fn test_overkill_leaves_leftover_and_kills() {
    let mut model = uniform_model(2);
    let outcome = model.apply_damage(500.0, &DamageDistribution::Fall, false);
    assert!((outcome.leftover - 340.0).abs() < 1e-2);
    assert!(model.iter().all(|p| p.current_health() <= HEALTH_EPSILON));
    assert_eq!(model.status(None), ModelStatus::Dead);
}

#[test]
fn test_bandage_heals_over_time() {
    let mut model = uniform_model(3);
    model.part_mut(PlayerPart::LeftLeg).apply_damage(10.0);
    model.apply_healer(PlayerPart::LeftLeg, PartHealer::bandage());

    // starving: only the bandage heals
    let ctx = PlayerContext::starving();
    for _ in 0..360 {
        model.tick(&ctx);
    }
    assert_eq!(model.part(PlayerPart::LeftLeg).current_health(), 11.0);

    for _ in 0..(360 * 3) {
        model.tick(&ctx);
    }
    assert_eq!(model.part(PlayerPart::LeftLeg).current_health(), 14.0);
    assert!(model.part(PlayerPart::LeftLeg).active_healer().is_none());

    for _ in 0..360 {
        model.tick(&ctx);
    }
    assert_eq!(model.part(PlayerPart::LeftLeg).current_health(), 14.0);
}

#[test]
fn test_player_lifecycle_through_store() {
    let mut store = DamageModelStore::with_seed(
        DamageModelConfig::default(),
        Arc::new(FirstAidRegistry::standard()),
        77,
    );
    let mut host = TestHost::default();
    let player = PlayerId::new();
    store.attach(player);
    let ctx = PlayerContext::default();

    // fall damage only lands on legs and feet
    let consumed = store
        .on_damage(player, &ctx, &DamageSource::new(damage_types::FALL), 8.0, &mut host)
        .unwrap();
    assert_eq!(consumed, 8.0);
    assert_eq!(host.tracked, 8.0);
    let model = store.model(player).unwrap();
    assert_eq!(model.part(PlayerPart::Head).current_health(), 4.0);
    assert_eq!(model.part(PlayerPart::Body).current_health(), 6.0);
    assert!((model.total_health() - 26.0).abs() < 1e-4);
    assert_eq!(model.status(Some(&ctx)), ModelStatus::Alive);

    // legs and feet at half health are slowed
    assert!(host
        .effects
        .iter()
        .any(|e| e.effect == EffectKind::Slowness && !e.is_clear()));

    store.on_tick(player, &ctx, &mut host).unwrap();
    assert_eq!(host.syncs.len(), 1);

    // bandage the left foot and let it run out
    assert!(store
        .use_healing_item(player, &ItemStack::single("bandage"), PlayerPart::LeftFoot)
        .unwrap());
    for _ in 0..(360 * 4) {
        store.on_tick(player, &PlayerContext::starving(), &mut host).unwrap();
    }
    let foot = store.model(player).unwrap().part(PlayerPart::LeftFoot);
    assert!(foot.is_full());
    assert!(foot.active_healer().is_none());

    // head hit kills
    store
        .on_damage(player, &ctx, &DamageSource::new(damage_types::ANVIL), 10.0, &mut host)
        .unwrap();
    assert_eq!(host.deaths, 1);
    assert_eq!(
        store.model(player).unwrap().status(Some(&ctx)),
        ModelStatus::Dead
    );

    store.on_death(player).unwrap();
    let model = store.model(player).unwrap();
    assert_eq!(model.status(Some(&ctx)), ModelStatus::Alive);
    assert_eq!(model.current_max_health(), 34);

    // revive on a living model changes nothing
    store.on_revive(player).unwrap();
    assert_eq!(store.model(player).unwrap().total_health(), 34.0);
}

#[test]
fn test_unregistered_source_falls_back_to_random() {
    let registry = FirstAidRegistry::standard();
    assert_eq!(
        registry.resolve_distribution(&DamageSource::new("lightning")),
        DamageDistribution::Random
    );
    assert_eq!(
        registry.resolve_distribution(&DamageSource::untyped()),
        DamageDistribution::Random
    );
    assert!(registry.part_healer(&ItemStack::single("stick")).is_none());
}

#[test]
fn test_registry_from_toml_drives_store() {
    let registry = RegistryConfig::from_toml_str(
        r#"
        [[static_bindings]]
        damage_type = "drown"
        distribution = { weighted = [{ part = "head", weight = 1.0 }, { part = "body", weight = 1.0 }] }
        "#,
    )
    .unwrap()
    .build();

    let mut store = DamageModelStore::with_seed(
        DamageModelConfig::uniform(20.0),
        Arc::new(registry),
        5,
    );
    let player = PlayerId::new();
    store.attach(player);
    store
        .on_damage(
            player,
            &PlayerContext::default(),
            &DamageSource::new(damage_types::DROWN),
            4.0,
            &mut TestHost::default(),
        )
        .unwrap();

    let model = store.model(player).unwrap();
    assert!((model.part(PlayerPart::Head).current_health() - 18.0).abs() < 1e-5);
    assert!((model.part(PlayerPart::Body).current_health() - 18.0).abs() < 1e-5);
}

#[test]
fn test_snapshot_json_round_trip() {
    let mut model = uniform_model(6);
    model.apply_damage(23.0, &DamageDistribution::Random, true);
    model.set_absorption(1.5);

    let json = ModelSnapshot::persisted(&model).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["schema_version"], SNAPSHOT_SCHEMA_VERSION);
    assert_eq!(value["parts"].as_array().map(Vec::len), Some(8));

    let mut restored = uniform_model(99);
    ModelSnapshot::from_json(&json)
        .unwrap()
        .apply_to(&mut restored)
        .unwrap();

    for part in PlayerPart::all() {
        assert_eq!(
            restored.part(part).current_health(),
            model.part(part).current_health()
        );
        assert_eq!(restored.part(part).is_critical(), model.part(part).is_critical());
    }
    assert_eq!(restored.absorption(), 1.5);
    assert_eq!(restored.invariant_repairs(), 0);
}

#[test]
fn test_corrupt_snapshot_is_repaired() {
    let mut snapshot = ModelSnapshot::persisted(&uniform_model(1));
    snapshot.parts[0].current_health = 35.0;
    snapshot.parts[1].current_health = -3.0;

    let mut model = uniform_model(1);
    snapshot.apply_to(&mut model).unwrap();
    assert_eq!(model.part(PlayerPart::Head).current_health(), 20.0);
    assert_eq!(model.part(PlayerPart::LeftArm).current_health(), 0.0);
    assert_eq!(model.invariant_repairs(), 2);
}

#[test]
fn test_snapshot_from_newer_version_is_rejected() {
    let mut snapshot = ModelSnapshot::persisted(&uniform_model(1));
    snapshot.schema_version = 7;
    let json = serde_json::to_string(&snapshot).unwrap();
    assert!(matches!(
        ModelSnapshot::from_json(&json),
        Err(FirstAidError::UnsupportedSchema { found: 7, .. })
    ));
}
