//! Timed healing applied to a single part by a healing item

use serde::{Deserialize, Serialize};

/// A healing item working on one part
///
/// Heals one step every `ticks_per_heal` ticks until `max_heals` steps are done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartHealer {
    /// Item id that produced this healer
    pub item: String,
    pub max_heals: u32,
    pub ticks_per_heal: u32,
    ticks_passed: u32,
    heals_done: u32,
}

impl PartHealer {
    pub fn new(item: impl Into<String>, max_heals: u32, ticks_per_heal: u32) -> Self {
        Self {
            item: item.into(),
            max_heals,
            ticks_per_heal: ticks_per_heal.max(1),
            ticks_passed: 0,
            heals_done: 0,
        }
    }

    /// 4 heals, one every 18 seconds
    pub fn bandage() -> Self {
        Self::new("bandage", 4, 360)
    }

    /// 2 heals, one every 22 seconds
    pub fn plaster() -> Self {
        Self::new("plaster", 2, 440)
    }

    /// Advance one tick. Returns true when a heal step is due.
    pub fn tick(&mut self) -> bool {
        if self.has_finished() {
            return false;
        }
        self.ticks_passed += 1;
        if self.ticks_passed >= self.ticks_per_heal {
            self.ticks_passed = 0;
            self.heals_done += 1;
            true
        } else {
            false
        }
    }

    pub fn has_finished(&self) -> bool {
        self.heals_done >= self.max_heals
    }

    pub fn heals_done(&self) -> u32 {
        self.heals_done
    }

    pub fn ticks_until_next_heal(&self) -> u32 {
        self.ticks_per_heal - self.ticks_passed
    }
}
