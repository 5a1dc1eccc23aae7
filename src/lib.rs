//! Egg Empire economy engine.
//!
//! An incremental-game core: arbitrary-magnitude quantities, exponential
//! cost curves, phase-gated progression, achievements, and a compressed
//! save format. Rendering is left to the host, which drives the engine
//! through [`EggEmpire`] and [`Scheduler`].

pub mod config;
pub mod economy;
pub mod error;
pub mod numeric;
pub mod storage;
pub mod time;

pub use config::EngineConfig;
pub use economy::achievements::AchievementProgress;
pub use economy::save::SaveManager;
pub use economy::scheduler::{FrameHandle, FrameReport, FrameRequester, Scheduler};
pub use economy::state::{GameState, SellKind};
pub use economy::EggEmpire;
pub use error::{ActionError, ConfigError, NumericParseError, SaveError};
pub use numeric::NumericValue;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{MemoryStorage, SaveStorage};
