//! FirstAid Simulator
//!
//! Headless run of one player's damage model: a seeded stream of hits,
//! bandages and ticks, followed by a per-part health readout.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use firstaid::core::types::Tick;
use firstaid::damage::debuff::EffectRequest;
use firstaid::damage::source::damage_types;
use firstaid::registry::RegistryConfig;
use firstaid::{
    DamageModelConfig, DamageModelStore, DamageSource, FirstAidRegistry, HostCallbacks,
    ItemStack, ModelSnapshot, PlayerContext, PlayerId, PlayerPart, Result,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// FirstAid Simulator - feed damage to a body-part health model
#[derive(Parser, Debug)]
#[command(name = "firstaid-sim")]
#[command(about = "Simulate damage, healing and ticks on one player's damage model")]
struct Args {
    /// Damage model config (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Registry bindings (TOML); stock registry when omitted
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks to simulate
    #[arg(long, default_value_t = 2400)]
    ticks: Tick,

    /// Damage events spread over the run
    #[arg(long, default_value_t = 12)]
    events: u32,

    /// Print the final state as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// Host that logs everything and keeps a few counters
#[derive(Default)]
struct LoggingHost {
    syncs: u32,
    deaths: u32,
    effects: u32,
}

impl HostCallbacks for LoggingHost {
    fn request_network_sync(&mut self, _player: PlayerId, snapshot: &ModelSnapshot) {
        self.syncs += 1;
        tracing::trace!("Sync: {:.1} absorption", snapshot.absorption);
    }

    fn notify_death(&mut self, player: PlayerId) {
        self.deaths += 1;
        tracing::info!("Player {:?} died", player.0);
    }

    fn track_damage(&mut self, _player: PlayerId, source: &DamageSource, amount: f32) {
        tracing::debug!(
            "Tracked {:.2} from {} (exhaustion {:.2})",
            amount,
            source.type_key().unwrap_or("unknown"),
            source.exhaustion
        );
    }

    fn apply_effect(&mut self, _player: PlayerId, effect: &EffectRequest) {
        self.effects += 1;
        if effect.is_clear() {
            tracing::debug!("Clearing {:?}", effect.effect);
        } else {
            tracing::debug!(
                "Applying {:?} {} for {} ticks",
                effect.effect,
                effect.amplifier,
                effect.duration_ticks
            );
        }
    }
}

const SOURCES: [&str; 5] = [
    damage_types::FALL,
    damage_types::ANVIL,
    damage_types::MOB_ATTACK,
    damage_types::DROWN,
    damage_types::STARVE,
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("firstaid=info")
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DamageModelConfig::load(path)?,
        None => DamageModelConfig::default(),
    };
    config.validate()?;

    let registry = match &args.registry {
        Some(path) => RegistryConfig::load(path)?.build(),
        None => FirstAidRegistry::standard(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    tracing::info!("FirstAid simulator starting (seed {})", seed);

    let mut store = DamageModelStore::with_seed(config, Arc::new(registry), seed);
    let mut host = LoggingHost::default();
    let player = PlayerId::new();
    store.attach(player);

    let event_every = (args.ticks / Tick::from(args.events.max(1))).max(1);
    let mut ctx = PlayerContext::default();

    for tick in 0..args.ticks {
        if tick % event_every == event_every / 2 {
            let kind = SOURCES[rng.gen_range(0..SOURCES.len())];
            let amount = rng.gen_range(1.0..8.0);
            ctx.food_level = if kind == damage_types::STARVE { 0 } else { 20 };

            let consumed =
                store.on_damage(player, &ctx, &DamageSource::new(kind), amount, &mut host)?;
            tracing::info!("Tick {}: {} hit for {:.2} ({:.2} consumed)", tick, kind, amount, consumed);

            if let Some(part) = most_hurt_part(&store, player) {
                store.use_healing_item(player, &ItemStack::single("bandage"), part)?;
            }
        }

        store.on_tick(player, &ctx, &mut host)?;

        if store.model(player).is_some_and(|m| m.is_dead(Some(&ctx))) {
            store.on_death(player)?;
        }
    }

    if args.json {
        if let Some(state) = store.read_display_state(player) {
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    } else {
        print_state(&store, player);
    }
    println!(
        "{} syncs, {} deaths, {} effect changes",
        host.syncs, host.deaths, host.effects
    );

    Ok(())
}

fn most_hurt_part(store: &DamageModelStore, player: PlayerId) -> Option<PlayerPart> {
    let model = store.model(player)?;
    model
        .iter()
        .filter(|p| !p.is_full() && !p.is_at_zero())
        .min_by(|a, b| a.health_fraction().total_cmp(&b.health_fraction()))
        .map(|p| p.part())
}

fn print_state(store: &DamageModelStore, player: PlayerId) {
    let Some(state) = store.read_display_state(player) else {
        return;
    };
    println!("\n=== DAMAGE MODEL ===");
    for part in state {
        println!(
            "  {:<11} {:>6.2} / {:<6.2}{}",
            format!("{:?}", part.part),
            part.health,
            part.max_health,
            if part.critical { "  CRITICAL" } else { "" }
        );
    }
    if let Some(model) = store.model(player) {
        println!(
            "  Total {:.1} / {}  status {:?}",
            model.total_health(),
            model.current_max_health(),
            model.status(None)
        );
    }
}
