//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a player entity as handed to us by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Vanilla max health of a player, the reference point for scaling
pub const VANILLA_MAX_HEALTH: f32 = 20.0;

/// Per-call view of the host's player state
///
/// The core never reaches into the host entity; everything it needs to know
/// about the player for one call is copied in here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerContext {
    /// Food bar, 0 to 20
    pub food_level: u32,
    /// Max health attribute after difficulty/potion modifiers
    pub max_health_attribute: f32,
    /// A revival mod is holding the player in a downed state
    pub revival_pending: bool,
    /// Pain suppression status effect is active
    pub morphine_active: bool,
    /// Creative/spectator players are not ticked
    pub creative: bool,
}

impl Default for PlayerContext {
    fn default() -> Self {
        Self {
            food_level: 20,
            max_health_attribute: VANILLA_MAX_HEALTH,
            revival_pending: false,
            morphine_active: false,
            creative: false,
        }
    }
}

impl PlayerContext {
    /// Context for a starving player (no regeneration possible)
    pub fn starving() -> Self {
        Self {
            food_level: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_ids_are_unique() {
        assert_ne!(PlayerId::new(), PlayerId::new());
    }

    #[test]
    fn test_default_context_is_well_fed() {
        let ctx = PlayerContext::default();
        assert_eq!(ctx.food_level, 20);
        assert_eq!(ctx.max_health_attribute, VANILLA_MAX_HEALTH);
        assert!(!ctx.revival_pending);
    }
}
