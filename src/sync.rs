//! Snapshot format for persistence and network sync, plus display state
//!
//! A snapshot is eight `(current, max, critical)` records in slot order, the
//! absorption shield and a schema version. `pending_resync` only travels in
//! sync packets and is left out of saved data.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{FirstAidError, Result};
use crate::damage::model::PlayerDamageModel;
use crate::damage::part::PlayerPart;

/// Newest snapshot layout this build writes and understands
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartSnapshot {
    pub current_health: f32,
    pub max_health: f32,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub schema_version: u32,
    /// One entry per part, in slot order
    pub parts: Vec<PartSnapshot>,
    pub absorption: f32,
    #[serde(default)]
    pub has_tutorial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_resync: Option<bool>,
}

impl ModelSnapshot {
    fn capture(model: &PlayerDamageModel) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            parts: model
                .iter()
                .map(|p| PartSnapshot {
                    current_health: p.current_health(),
                    max_health: p.max_health(),
                    critical: p.is_critical(),
                })
                .collect(),
            absorption: model.absorption(),
            has_tutorial: model.has_tutorial,
            pending_resync: None,
        }
    }

    /// Snapshot for saving to disk
    pub fn persisted(model: &PlayerDamageModel) -> Self {
        Self::capture(model)
    }

    /// Snapshot for remote observers
    pub fn sync(model: &PlayerDamageModel) -> Self {
        Self {
            pending_resync: Some(model.needs_resync()),
            ..Self::capture(model)
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode and check version and part count
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version > SNAPSHOT_SCHEMA_VERSION {
            return Err(FirstAidError::UnsupportedSchema {
                found: self.schema_version,
                supported: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        if self.parts.len() != PlayerPart::COUNT {
            return Err(FirstAidError::MalformedSnapshot(format!(
                "expected {} parts, found {}",
                PlayerPart::COUNT,
                self.parts.len()
            )));
        }
        Ok(())
    }

    /// Load this snapshot into a model
    ///
    /// Out-of-range health is repaired (and counted by the part). The model
    /// rescales on its next tick.
    pub fn apply_to(&self, model: &mut PlayerDamageModel) -> Result<()> {
        self.validate()?;
        for (part, stored) in PlayerPart::all().into_iter().zip(&self.parts) {
            model
                .part_mut(part)
                .restore(stored.current_health, stored.max_health);
        }
        model.set_absorption(self.absorption);
        model.has_tutorial = self.has_tutorial;
        model.invalidate_scale();
        debug!(
            "Restored damage model (schema {}, {:.1} health)",
            self.schema_version,
            model.total_health()
        );
        Ok(())
    }
}

/// What a HUD needs to draw one part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartDisplay {
    pub part: PlayerPart,
    pub health: f32,
    pub max_health: f32,
    pub critical: bool,
}

impl PlayerDamageModel {
    /// Per-part display state in slot order
    pub fn display_state(&self) -> [PartDisplay; PlayerPart::COUNT] {
        PlayerPart::all().map(|part| {
            let p = self.part(part);
            PartDisplay {
                part,
                health: p.current_health(),
                max_health: p.max_health(),
                critical: p.is_critical(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DamageModelConfig;
    use crate::registry::FirstAidRegistry;

    fn model() -> PlayerDamageModel {
        PlayerDamageModel::with_seed(
            &DamageModelConfig::uniform(20.0),
            &FirstAidRegistry::empty(),
            2,
        )
    }

    #[test]
    fn test_persisted_snapshot_omits_resync_flag() {
        let m = model();
        let json = ModelSnapshot::persisted(&m).to_json().unwrap();
        assert!(!json.contains("pending_resync"));

        let json = ModelSnapshot::sync(&m).to_json().unwrap();
        assert!(json.contains("\"pending_resync\":true"));
    }

    #[test]
    fn test_snapshot_restores_model() {
        let mut source = model();
        source.part_mut(PlayerPart::LeftLeg).apply_damage(17.5);
        source.set_absorption(2.0);
        source.has_tutorial = true;
        let json = ModelSnapshot::persisted(&source).to_json().unwrap();

        let mut restored = model();
        ModelSnapshot::from_json(&json)
            .unwrap()
            .apply_to(&mut restored)
            .unwrap();

        assert_eq!(restored.part(PlayerPart::LeftLeg).current_health(), 2.5);
        assert!(restored.part(PlayerPart::LeftLeg).is_critical());
        assert_eq!(restored.absorption(), 2.0);
        assert!(restored.has_tutorial);
        assert_eq!(restored.invariant_repairs(), 0);
    }

    #[test]
    fn test_parts_in_slot_order() {
        let mut m = model();
        m.part_mut(PlayerPart::Body).apply_damage(1.0);
        let snapshot = ModelSnapshot::persisted(&m);
        assert_eq!(snapshot.parts[4].current_health, 19.0);
        assert_eq!(snapshot.parts[0].current_health, 20.0);
    }

    #[test]
    fn test_rejects_future_schema() {
        let mut snapshot = ModelSnapshot::persisted(&model());
        snapshot.schema_version = SNAPSHOT_SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            ModelSnapshot::from_json(&json),
            Err(FirstAidError::UnsupportedSchema { .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_part_count() {
        let mut snapshot = ModelSnapshot::persisted(&model());
        snapshot.parts.pop();
        assert!(matches!(
            snapshot.apply_to(&mut model()),
            Err(FirstAidError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let parts = vec![
            PartSnapshot {
                current_health: 20.0,
                max_health: 20.0,
                critical: false,
            };
            PlayerPart::COUNT
        ];
        let json = serde_json::json!({
            "schema_version": 1,
            "parts": parts,
            "absorption": 0.0,
        })
        .to_string();
        let snapshot = ModelSnapshot::from_json(&json).unwrap();
        assert!(!snapshot.has_tutorial);
        assert_eq!(snapshot.pending_resync, None);
    }

    #[test]
    fn test_display_state() {
        let mut m = model();
        m.part_mut(PlayerPart::RightArm).apply_damage(19.0);
        let display = m.display_state();
        assert_eq!(display[5].part, PlayerPart::RightArm);
        assert_eq!(display[5].health, 1.0);
        assert!(display[5].critical);
        assert!(!display[0].critical);
    }
}
