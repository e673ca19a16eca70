//! Damage distributions: how one hit is split across the eight parts
//!
//! Every distribution returns what it could not place. Callers hand any
//! leftover to `Random` (see [`distribute_with_fallback`]), so damage is only
//! ever lost once every part is at zero.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::damage::constants::{
    HEALTH_EPSILON, RANDOM_MAX_PICKS, RANDOM_MIN_CHUNK, RANDOM_MIN_FRACTION,
};
use crate::damage::model::PlayerDamageModel;
use crate::damage::part::{DamageablePart, PlayerPart};

/// One target of a weighted split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartWeight {
    pub part: PlayerPart,
    pub weight: f32,
}

impl PartWeight {
    pub fn new(part: PlayerPart, weight: f32) -> Self {
        Self { part, weight }
    }
}

/// Policy for splitting damage across parts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageDistribution {
    /// Random parts, weighted by max health, random share each pick
    #[default]
    Random,
    /// Everything on the head
    Head,
    /// Legs and feet, weighted by max health
    Fall,
    /// Even split across all eight parts, ignores absorption
    Starve,
    /// Fixed split over the listed parts
    Weighted(Vec<PartWeight>),
}

impl DamageDistribution {
    pub fn name(&self) -> &'static str {
        match self {
            DamageDistribution::Random => "random",
            DamageDistribution::Head => "head",
            DamageDistribution::Fall => "fall",
            DamageDistribution::Starve => "starve",
            DamageDistribution::Weighted(_) => "weighted",
        }
    }

    /// Starvation is applied before the absorption shield is consulted
    pub fn bypasses_absorption(&self) -> bool {
        matches!(self, DamageDistribution::Starve)
    }

    /// Split `amount` across the model's parts, returning the leftover
    pub fn distribute_damage(&self, amount: f32, model: &mut PlayerDamageModel) -> f32 {
        let (parts, rng) = model.parts_and_rng_mut();
        self.distribute_over(amount, parts, rng)
    }

    pub(crate) fn distribute_over<R: Rng>(
        &self,
        amount: f32,
        parts: &mut [DamageablePart; PlayerPart::COUNT],
        rng: &mut R,
    ) -> f32 {
        if amount.is_nan() || amount <= 0.0 {
            return 0.0;
        }

        match self {
            DamageDistribution::Random => random_split(amount, parts, rng),
            DamageDistribution::Head => parts[PlayerPart::Head.index()].apply_damage(amount),
            DamageDistribution::Fall => {
                let targets: Vec<PartWeight> = PlayerPart::all()
                    .into_iter()
                    .filter(|p| p.is_lower_body())
                    .map(|p| PartWeight::new(p, parts[p.index()].max_health()))
                    .collect();
                weighted_split(amount, parts, &targets)
            }
            DamageDistribution::Starve => {
                let targets: Vec<PartWeight> = PlayerPart::all()
                    .into_iter()
                    .map(|p| PartWeight::new(p, 1.0))
                    .collect();
                weighted_split(amount, parts, &targets)
            }
            DamageDistribution::Weighted(targets) => weighted_split(amount, parts, targets),
        }
    }
}

/// Run `distribution`, then place any leftover with `Random`
///
/// Returns what is still left once every part is at zero.
pub fn distribute_with_fallback(
    distribution: &DamageDistribution,
    amount: f32,
    model: &mut PlayerDamageModel,
) -> f32 {
    let leftover = distribution.distribute_damage(amount, model);
    if leftover <= 0.0 || *distribution == DamageDistribution::Random {
        return leftover;
    }

    debug!(
        "{} distribution left {:.3} of {:.3}, redistributing randomly",
        distribution.name(),
        leftover,
        amount
    );
    DamageDistribution::Random.distribute_damage(leftover, model)
}

fn weighted_split(
    amount: f32,
    parts: &mut [DamageablePart; PlayerPart::COUNT],
    targets: &[PartWeight],
) -> f32 {
    let total: f32 = targets.iter().map(|t| t.weight.max(0.0)).sum();
    if total <= 0.0 {
        return amount;
    }

    targets
        .iter()
        .filter(|t| t.weight > 0.0)
        .map(|t| parts[t.part.index()].apply_damage(amount * t.weight / total))
        .sum()
}

fn random_split<R: Rng>(
    amount: f32,
    parts: &mut [DamageablePart; PlayerPart::COUNT],
    rng: &mut R,
) -> f32 {
    let mut remaining = amount;
    let mut picks = 0;

    while remaining > HEALTH_EPSILON {
        let alive: Vec<usize> = (0..parts.len()).filter(|&i| !parts[i].is_at_zero()).collect();
        if alive.is_empty() {
            break;
        }

        let target = pick_weighted(&alive, parts, rng);
        picks += 1;

        let chunk = if remaining <= RANDOM_MIN_CHUNK || picks >= RANDOM_MAX_PICKS {
            remaining
        } else {
            remaining * rng.gen_range(RANDOM_MIN_FRACTION..=1.0)
        };

        // A part that survives took the whole chunk; one that dies took what
        // it had. Overflow arithmetic would turn an infinite chunk into NaN.
        let before = parts[target].current_health();
        parts[target].apply_damage(chunk);
        remaining -= if parts[target].is_at_zero() { before } else { chunk };
    }

    if remaining > HEALTH_EPSILON {
        remaining
    } else {
        0.0
    }
}

fn pick_weighted<R: Rng>(
    alive: &[usize],
    parts: &[DamageablePart; PlayerPart::COUNT],
    rng: &mut R,
) -> usize {
    if alive.len() == 1 {
        return alive[0];
    }
    match WeightedIndex::new(alive.iter().map(|&i| parts[i].max_health())) {
        Ok(weights) => alive[weights.sample(rng)],
        Err(_) => alive[rng.gen_range(0..alive.len())],
    }
}
