//! FirstAid - per-body-part damage model for players
//!
//! A player's health is split across eight parts. Incoming damage is spread
//! over them by a distribution chosen from the damage source, healing items
//! restore single parts over time, and low health on a part applies debuffs.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`core`] | Errors, config, shared types |
//! | [`damage`] | Parts, distributions, healers, debuffs, the player model |
//! | [`registry`] | Source-to-distribution bindings, healing items, debuff factories |
//! | [`sync`] | Persisted/networked snapshots and display state |
//! | [`host`] | Per-player model store and host callbacks |

pub mod core;
pub mod damage;
pub mod host;
pub mod registry;
pub mod sync;

pub use crate::core::{DamageModelConfig, FirstAidError, PlayerContext, PlayerId, Result};
pub use damage::{DamageDistribution, DamageSource, PlayerDamageModel, PlayerPart};
pub use host::{DamageModelStore, HostCallbacks};
pub use registry::{FirstAidRegistry, ItemStack};
pub use sync::ModelSnapshot;
