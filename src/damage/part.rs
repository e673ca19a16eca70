//! Body parts (8 slots) and the per-part health state machine
//!
//! Each part tracks its own health pool. Damage past zero is handed back to
//! the caller as overflow so it can be placed elsewhere.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::damage::constants::{HEALTH_EPSILON, HEAL_PER_STEP};
use crate::damage::healer::PartHealer;

/// Body part slots, in the fixed order used for iteration and serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerPart {
    Head,
    LeftArm,
    LeftLeg,
    LeftFoot,
    Body,
    RightArm,
    RightLeg,
    RightFoot,
}

impl PlayerPart {
    pub const COUNT: usize = 8;

    /// Returns all parts in slot order
    pub fn all() -> [PlayerPart; 8] {
        [
            PlayerPart::Head,
            PlayerPart::LeftArm,
            PlayerPart::LeftLeg,
            PlayerPart::LeftFoot,
            PlayerPart::Body,
            PlayerPart::RightArm,
            PlayerPart::RightLeg,
            PlayerPart::RightFoot,
        ]
    }

    /// Position in slot order
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<PlayerPart> {
        Self::all().get(index).copied()
    }

    pub fn is_arm(self) -> bool {
        matches!(self, PlayerPart::LeftArm | PlayerPart::RightArm)
    }

    pub fn is_leg(self) -> bool {
        matches!(self, PlayerPart::LeftLeg | PlayerPart::RightLeg)
    }

    pub fn is_foot(self) -> bool {
        matches!(self, PlayerPart::LeftFoot | PlayerPart::RightFoot)
    }

    /// Legs and feet
    pub fn is_lower_body(self) -> bool {
        self.is_leg() || self.is_foot()
    }
}

/// Health state of one body part
///
/// Keeps `0 <= current_health <= max_health <= absolute_max_health`. Every
/// mutation re-checks this; a repair is logged and counted, since it means
/// some arithmetic upstream went wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageablePart {
    part: PlayerPart,
    current_health: f32,
    max_health: f32,
    absolute_max_health: f32,
    can_cause_death: bool,
    critical_threshold: f32,
    critical: bool,
    /// Lowest health seen since the last full reset
    lowest_health: f32,
    active_healer: Option<PartHealer>,
    invariant_repairs: u32,
}

impl DamageablePart {
    pub fn new(
        part: PlayerPart,
        max_health: f32,
        absolute_max_health: f32,
        can_cause_death: bool,
        critical_threshold: f32,
    ) -> Self {
        let absolute_max_health = absolute_max_health.max(max_health);
        let mut new_part = Self {
            part,
            current_health: max_health,
            max_health,
            absolute_max_health,
            can_cause_death,
            critical_threshold,
            critical: false,
            lowest_health: max_health,
            active_healer: None,
            invariant_repairs: 0,
        };
        new_part.update_critical();
        new_part
    }

    pub fn part(&self) -> PlayerPart {
        self.part
    }

    pub fn current_health(&self) -> f32 {
        self.current_health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn absolute_max_health(&self) -> f32 {
        self.absolute_max_health
    }

    pub fn can_cause_death(&self) -> bool {
        self.can_cause_death
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub fn lowest_health(&self) -> f32 {
        self.lowest_health
    }

    pub fn active_healer(&self) -> Option<&PartHealer> {
        self.active_healer.as_ref()
    }

    pub fn invariant_repairs(&self) -> u32 {
        self.invariant_repairs
    }

    /// Health as a fraction of max (0.0 to 1.0)
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.current_health / self.max_health
        }
    }

    pub fn is_at_zero(&self) -> bool {
        self.current_health <= HEALTH_EPSILON
    }

    pub fn is_full(&self) -> bool {
        self.current_health >= self.max_health - HEALTH_EPSILON
    }

    /// Apply damage, returning the part of `amount` this part could not absorb
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        if amount.is_nan() || amount <= 0.0 {
            return 0.0;
        }

        let mut absorbed = amount.min(self.current_health);
        self.current_health -= absorbed;

        // Don't leave float dust behind that keeps a part "alive"
        if self.current_health <= HEALTH_EPSILON {
            absorbed += self.current_health;
            self.current_health = 0.0;
        }

        self.lowest_health = self.lowest_health.min(self.current_health);
        self.update_critical();
        self.check_invariants();

        (amount - absorbed).max(0.0)
    }

    /// Heal this part. Anything past max health is dropped.
    pub fn heal(&mut self, amount: f32) {
        if amount.is_nan() || amount <= 0.0 {
            return;
        }
        self.current_health = (self.current_health + amount).min(self.max_health);
        self.update_critical();
        self.check_invariants();
    }

    /// Advance one tick: step the active healer, then passive regeneration
    ///
    /// `regen_per_tick` is a fraction of max health, applied only when
    /// `regen_allowed` and the part is not critical. Returns true if health
    /// changed.
    pub fn tick(&mut self, regen_allowed: bool, regen_per_tick: f32) -> bool {
        let before = self.current_health;

        if let Some(healer) = self.active_healer.as_mut() {
            let heal_now = healer.tick();
            let finished = healer.has_finished();
            if heal_now {
                self.heal(HEAL_PER_STEP);
            }
            if finished {
                debug!("{} on {:?} finished", healer_name(&self.active_healer), self.part);
                self.active_healer = None;
            }
        }

        if regen_allowed && !self.critical && !self.is_full() {
            self.heal(self.max_health * regen_per_tick);
        }

        self.current_health != before
    }

    /// Start a healing item on this part, replacing any running one
    pub fn apply_healer(&mut self, healer: PartHealer) {
        debug!("Applying {} to {:?}", healer.item, self.part);
        self.active_healer = Some(healer);
    }

    /// Change max health, keeping the current-to-max ratio
    pub fn set_max_health(&mut self, max_health: f32) {
        let ratio = self.health_fraction();
        self.max_health = max_health.clamp(HEALTH_EPSILON, self.absolute_max_health);
        // No dust snapping: scaling back up must restore the same ratio
        self.current_health = self.max_health * ratio;
        self.update_critical();
        self.check_invariants();
    }

    /// Change the scaling ceiling; max health follows it down if needed
    pub fn set_absolute_max_health(&mut self, absolute_max_health: f32) {
        self.absolute_max_health = absolute_max_health.max(HEALTH_EPSILON);
        if self.max_health > self.absolute_max_health {
            self.set_max_health(self.absolute_max_health);
        }
    }

    pub fn set_critical_threshold(&mut self, threshold: f32) {
        self.critical_threshold = threshold;
        self.update_critical();
    }

    pub fn set_can_cause_death(&mut self, can_cause_death: bool) {
        self.can_cause_death = can_cause_death;
    }

    /// Back to full health with no healer or critical state
    pub fn reset(&mut self) {
        self.current_health = self.max_health;
        self.lowest_health = self.max_health;
        self.active_healer = None;
        self.update_critical();
    }

    /// Overwrite health from stored data
    ///
    /// Max health is limited to the absolute max; current health outside
    /// `[0, max]` is repaired and counted.
    pub fn restore(&mut self, current_health: f32, max_health: f32) {
        if max_health.is_finite() && max_health > 0.0 {
            self.max_health = max_health.min(self.absolute_max_health);
        }
        self.current_health = current_health;
        self.check_invariants();
        self.lowest_health = self.current_health;
        self.update_critical();
    }

    fn update_critical(&mut self) {
        self.critical = self.current_health < self.max_health * self.critical_threshold;
    }

    /// Clamp back into range. Returns true if anything had to be repaired.
    fn check_invariants(&mut self) -> bool {
        let mut repaired = false;

        if self.max_health > self.absolute_max_health {
            self.max_health = self.absolute_max_health;
            repaired = true;
        }
        if !self.current_health.is_finite() || self.current_health < 0.0 {
            self.current_health = 0.0;
            repaired = true;
        } else if self.current_health > self.max_health {
            self.current_health = self.max_health;
            repaired = true;
        }

        if repaired {
            self.invariant_repairs += 1;
            self.update_critical();
            warn!(
                "Repaired health of {:?} to {}/{} ({} repairs so far)",
                self.part, self.current_health, self.max_health, self.invariant_repairs
            );
        }
        repaired
    }
}

fn healer_name(healer: &Option<PartHealer>) -> &str {
    healer.as_ref().map(|h| h.item.as_str()).unwrap_or("healer")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(max: f32) -> DamageablePart {
        DamageablePart::new(PlayerPart::LeftArm, max, max * 4.0, false, 0.2)
    }

    #[test]
    fn test_part_count_and_order() {
        let all = PlayerPart::all();
        assert_eq!(all.len(), PlayerPart::COUNT);
        for (i, p) in all.iter().enumerate() {
            assert_eq!(p.index(), i);
            assert_eq!(PlayerPart::from_index(i), Some(*p));
        }
        assert_eq!(PlayerPart::from_index(8), None);
    }

    #[test]
    fn test_part_categories() {
        assert!(PlayerPart::LeftLeg.is_lower_body());
        assert!(PlayerPart::RightFoot.is_lower_body());
        assert!(!PlayerPart::Body.is_lower_body());
        assert!(PlayerPart::RightArm.is_arm());
        assert!(!PlayerPart::RightLeg.is_arm());
    }

    #[test]
    fn test_damage_within_health_has_no_overflow() {
        let mut p = part(20.0);
        assert_eq!(p.apply_damage(5.0), 0.0);
        assert_eq!(p.current_health(), 15.0);
        assert!(!p.is_critical());
    }

    #[test]
    fn test_damage_past_zero_reports_overflow() {
        let mut p = part(4.0);
        let overflow = p.apply_damage(6.5);
        assert_eq!(p.current_health(), 0.0);
        assert!((overflow - 2.5).abs() < 1e-6);
        assert!(p.is_at_zero());
        assert!(p.is_critical());
    }

    #[test]
    fn test_damage_snaps_float_dust_to_zero() {
        let mut p = part(4.0);
        let overflow = p.apply_damage(4.0 - HEALTH_EPSILON / 2.0);
        assert_eq!(p.current_health(), 0.0);
        assert_eq!(overflow, 0.0);
    }

    #[test]
    fn test_non_positive_damage_ignored() {
        let mut p = part(4.0);
        assert_eq!(p.apply_damage(-3.0), 0.0);
        assert_eq!(p.apply_damage(f32::NAN), 0.0);
        assert_eq!(p.current_health(), 4.0);
    }

    #[test]
    fn test_critical_threshold_crossing() {
        let mut p = part(20.0);
        p.apply_damage(15.9);
        assert!(!p.is_critical());
        p.apply_damage(0.2);
        assert!(p.is_critical());
        p.heal(1.0);
        assert!(!p.is_critical());
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut p = part(4.0);
        p.apply_damage(1.0);
        p.heal(10.0);
        assert_eq!(p.current_health(), 4.0);
        assert_eq!(p.invariant_repairs(), 0);
    }

    #[test]
    fn test_lowest_health_tracked_until_reset() {
        let mut p = part(10.0);
        p.apply_damage(7.0);
        p.heal(5.0);
        assert_eq!(p.lowest_health(), 3.0);
        p.reset();
        assert_eq!(p.lowest_health(), 10.0);
        assert_eq!(p.current_health(), 10.0);
    }

    #[test]
    fn test_passive_regen_skips_critical_parts() {
        let mut p = part(10.0);
        p.apply_damage(9.5);
        assert!(p.is_critical());
        assert!(!p.tick(true, 0.01));
        assert_eq!(p.current_health(), 0.5);
    }

    #[test]
    fn test_passive_regen_rate() {
        let mut p = part(10.0);
        p.apply_damage(5.0);
        assert!(p.tick(true, 0.01));
        assert!((p.current_health() - 5.1).abs() < 1e-5);
        assert!(!p.tick(false, 0.01));
    }

    #[test]
    fn test_healer_heals_and_is_removed() {
        let mut p = part(10.0);
        p.apply_damage(9.0);
        p.apply_healer(PartHealer::new("test", 2, 2));
        p.tick(false, 0.0);
        assert_eq!(p.current_health(), 1.0);
        p.tick(false, 0.0);
        assert_eq!(p.current_health(), 2.0);
        p.tick(false, 0.0);
        p.tick(false, 0.0);
        assert_eq!(p.current_health(), 3.0);
        assert!(p.active_healer().is_none());
    }

    #[test]
    fn test_set_max_health_keeps_ratio() {
        let mut p = part(10.0);
        p.apply_damage(5.0);
        p.set_max_health(20.0);
        assert_eq!(p.max_health(), 20.0);
        assert_eq!(p.current_health(), 10.0);
    }

    #[test]
    fn test_tiny_max_health_keeps_ratio() {
        let mut p = part(10.0);
        p.apply_damage(9.9);
        p.set_max_health(0.001);
        assert!(p.current_health() > 0.0);
        p.set_max_health(10.0);
        assert!((p.current_health() - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_set_max_health_capped_by_absolute() {
        let mut p = part(10.0);
        p.set_max_health(100.0);
        assert_eq!(p.max_health(), 40.0);
        assert_eq!(p.current_health(), 40.0);
        p.set_absolute_max_health(15.0);
        assert_eq!(p.max_health(), 15.0);
        assert_eq!(p.current_health(), 15.0);
    }

    #[test]
    fn test_restore_repairs_out_of_range() {
        let mut p = part(10.0);
        p.restore(12.0, 10.0);
        assert_eq!(p.current_health(), 10.0);
        assert_eq!(p.invariant_repairs(), 1);

        p.restore(-1.0, 10.0);
        assert_eq!(p.current_health(), 0.0);
        assert_eq!(p.invariant_repairs(), 2);
        assert!(p.is_critical());
    }
}
