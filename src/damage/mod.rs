pub mod constants;
pub mod debuff;
pub mod distribution;
pub mod healer;
pub mod model;
pub mod part;
pub mod source;

pub use debuff::{ConstantDebuff, Debuff, DebuffSlot, EffectKind, EffectRequest, OnHitDebuff};
pub use distribution::{distribute_with_fallback, DamageDistribution, PartWeight};
pub use healer::PartHealer;
pub use model::{DamageOutcome, ModelStatus, Penalties, PlayerDamageModel, TickOutcome};
pub use part::{DamageablePart, PlayerPart};
pub use source::DamageSource;
