pub mod config;
pub mod error;
pub mod types;

pub use config::DamageModelConfig;
pub use error::{FirstAidError, Result};
pub use types::{PlayerContext, PlayerId, Tick};
