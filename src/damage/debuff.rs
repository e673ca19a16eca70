//! Debuffs: status effects driven by the health of a group of parts
//!
//! On-hit debuffs react to a single hit, constant debuffs hold an effect for
//! as long as the slot stays below a health fraction. Debuffs only produce
//! effect requests; applying them is the host's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::damage::constants::{CONSTANT_EFFECT_REFRESH_TICKS, CONSTANT_EFFECT_TICKS};
use crate::damage::part::PlayerPart;

/// Groups of parts that share debuffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebuffSlot {
    Head,
    Body,
    Arms,
    LegsAndFeet,
}

impl DebuffSlot {
    pub const COUNT: usize = 4;

    pub fn all() -> [DebuffSlot; 4] {
        [
            DebuffSlot::Head,
            DebuffSlot::Body,
            DebuffSlot::Arms,
            DebuffSlot::LegsAndFeet,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Parts covered by this slot
    pub fn parts(self) -> &'static [PlayerPart] {
        match self {
            DebuffSlot::Head => &[PlayerPart::Head],
            DebuffSlot::Body => &[PlayerPart::Body],
            DebuffSlot::Arms => &[PlayerPart::LeftArm, PlayerPart::RightArm],
            DebuffSlot::LegsAndFeet => &[
                PlayerPart::LeftLeg,
                PlayerPart::RightLeg,
                PlayerPart::LeftFoot,
                PlayerPart::RightFoot,
            ],
        }
    }

    pub fn for_part(part: PlayerPart) -> DebuffSlot {
        match part {
            PlayerPart::Head => DebuffSlot::Head,
            PlayerPart::Body => DebuffSlot::Body,
            PlayerPart::LeftArm | PlayerPart::RightArm => DebuffSlot::Arms,
            _ => DebuffSlot::LegsAndFeet,
        }
    }
}

/// Status effects the host knows how to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Blindness,
    Nausea,
    Slowness,
    MiningFatigue,
    Weakness,
}

/// Request for the host to apply (or, with zero duration, remove) an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRequest {
    pub effect: EffectKind,
    pub duration_ticks: u32,
    pub amplifier: u8,
}

impl EffectRequest {
    pub fn clear(effect: EffectKind) -> Self {
        Self {
            effect,
            duration_ticks: 0,
            amplifier: 0,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.duration_ticks == 0
    }
}

/// A debuff attached to one slot of one player's model
pub trait Debuff: fmt::Debug + Send + Sync {
    /// The slot just took `damage`; `health_fraction` is its health afterwards
    fn handle_damage_taken(&mut self, damage: f32, health_fraction: f32) -> Option<EffectRequest>;

    /// Called once per tick with the slot's health fraction
    fn update(&mut self, _health_fraction: f32) -> Option<EffectRequest> {
        None
    }
}

/// Applies an effect when a single hit is big enough
#[derive(Debug, Clone, PartialEq)]
pub struct OnHitDebuff {
    pub effect: EffectKind,
    /// `(min damage, duration)` pairs, highest damage first
    thresholds: Vec<(f32, u32)>,
}

impl OnHitDebuff {
    pub fn new(effect: EffectKind, mut thresholds: Vec<(f32, u32)>) -> Self {
        thresholds.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self { effect, thresholds }
    }
}

impl Debuff for OnHitDebuff {
    fn handle_damage_taken(&mut self, damage: f32, _health_fraction: f32) -> Option<EffectRequest> {
        self.thresholds
            .iter()
            .find(|(min_damage, _)| damage >= *min_damage)
            .map(|&(_, duration_ticks)| EffectRequest {
                effect: self.effect,
                duration_ticks,
                amplifier: 0,
            })
    }
}

/// Holds an effect while the slot's health is low
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDebuff {
    pub effect: EffectKind,
    /// `(health fraction, amplifier)` pairs, lowest fraction first
    thresholds: Vec<(f32, u8)>,
    active: Option<u8>,
    ticks_since_refresh: u32,
}

impl ConstantDebuff {
    pub fn new(effect: EffectKind, mut thresholds: Vec<(f32, u8)>) -> Self {
        thresholds.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            effect,
            thresholds,
            active: None,
            ticks_since_refresh: 0,
        }
    }

    pub fn active_amplifier(&self) -> Option<u8> {
        self.active
    }

    fn amplifier_for(&self, health_fraction: f32) -> Option<u8> {
        self.thresholds
            .iter()
            .find(|(fraction, _)| health_fraction < *fraction)
            .map(|&(_, amplifier)| amplifier)
    }

    fn sync_to(&mut self, health_fraction: f32) -> Option<EffectRequest> {
        let wanted = self.amplifier_for(health_fraction);
        self.ticks_since_refresh += 1;

        let request = match (self.active, wanted) {
            (Some(_), None) => Some(EffectRequest::clear(self.effect)),
            (_, Some(amplifier))
                if self.active != wanted
                    || self.ticks_since_refresh >= CONSTANT_EFFECT_REFRESH_TICKS =>
            {
                Some(EffectRequest {
                    effect: self.effect,
                    duration_ticks: CONSTANT_EFFECT_TICKS,
                    amplifier,
                })
            }
            _ => None,
        };

        if request.is_some() {
            self.ticks_since_refresh = 0;
        }
        self.active = wanted;
        request
    }
}

impl Debuff for ConstantDebuff {
    fn handle_damage_taken(&mut self, _damage: f32, health_fraction: f32) -> Option<EffectRequest> {
        self.sync_to(health_fraction)
    }

    fn update(&mut self, health_fraction: f32) -> Option<EffectRequest> {
        self.sync_to(health_fraction)
    }
}
