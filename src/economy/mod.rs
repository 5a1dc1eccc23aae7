//! Egg Empire: an incremental egg-farming economy.
//!
//! [`EggEmpire`] is the action API hosts call. It owns the [`GameState`],
//! the RNG used for hatching, and the engine config. Actions return plain
//! `bool`/counts; the reasons for rejections are logged at `debug`.

pub mod achievements;
pub mod defs;
pub mod formulas;
pub mod logic;
pub mod save;
pub mod scheduler;
pub mod state;

mod simulator;

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::ActionError;
use crate::numeric::NumericValue;

use achievements::AchievementProgress;
use state::{GameState, SellKind};

pub struct EggEmpire {
    state: GameState,
    rng: StdRng,
    config: EngineConfig,
}

/// Log a rejected action and collapse it to `None`.
fn rejected<T>(action: &str, result: Result<T, ActionError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(action, reason = %e, "action rejected");
            None
        }
    }
}

impl EggEmpire {
    /// Fresh game with default config. `seed` drives hatch rolls.
    pub fn new(seed: u64) -> Self {
        Self::with_config(EngineConfig::default(), seed)
    }

    pub fn with_config(config: EngineConfig, seed: u64) -> Self {
        Self {
            state: GameState::new(),
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Actions ───────────────────────────────────────────

    /// Returns the eggs gained.
    pub fn click(&mut self) -> NumericValue {
        logic::click(&mut self.state)
    }

    pub fn buy(&mut self, id: &str, amount: u64) -> bool {
        rejected("buy", logic::buy_producer(&mut self.state, id, amount)).is_some()
    }

    /// Returns how many units were bought (0 on failure).
    pub fn buy_max(&mut self, id: &str) -> u64 {
        rejected("buy_max", logic::buy_max(&mut self.state, id)).unwrap_or(0)
    }

    pub fn buy_upgrade(&mut self, id: &str) -> bool {
        rejected("buy_upgrade", logic::buy_upgrade(&mut self.state, id)).is_some()
    }

    /// `true` only when the egg hatched into a chicken.
    pub fn hatch(&mut self) -> bool {
        rejected("hatch", logic::hatch(&mut self.state, &mut self.rng)).unwrap_or(false)
    }

    pub fn sell(&mut self, kind: SellKind, amount: u64) -> bool {
        rejected("sell", logic::sell(&mut self.state, kind, amount)).is_some()
    }

    pub fn buy_auto_hatcher(&mut self) -> bool {
        rejected("buy_auto_hatcher", logic::buy_auto_hatcher(&mut self.state)).is_some()
    }

    pub fn prestige(&mut self) -> bool {
        rejected("prestige", logic::prestige(&mut self.state)).is_some()
    }

    /// Advance by `dt` seconds. Returns newly unlocked achievement ids.
    pub fn tick(&mut self, dt: f64) -> Vec<String> {
        logic::tick(&mut self.state, dt, &mut self.rng)
    }

    /// Credit eggs for the time since the last save (wall clock ms).
    /// Returns the eggs credited; gaps under `min_offline_ms` earn nothing.
    pub fn apply_offline_progress(&mut self, now_ms: u64) -> NumericValue {
        let elapsed = now_ms.saturating_sub(self.state.last_save_time);
        if elapsed < self.config.min_offline_ms {
            return NumericValue::ZERO;
        }
        let gain = formulas::offline_progress(
            self.state.primary_rate(),
            elapsed,
            self.config.max_offline_ms,
        );
        if let Some(eggs) = self.state.resources.get_mut(defs::PRIMARY_RESOURCE) {
            eggs.add(gain);
        }
        if gain.is_positive() {
            self.state.statistics.total_eggs_produced += gain;
        }
        // Later calls measure from here, so the same gap is never paid twice.
        self.state.last_save_time = now_ms;
        info!(elapsed_ms = elapsed, gain = %gain, "offline progress applied");
        gain
    }

    // ── Read accessors ────────────────────────────────────

    /// Price of the next unit; `None` for an unknown producer.
    pub fn current_cost(&self, id: &str) -> Option<NumericValue> {
        self.state.producer(id).map(|p| p.current_cost())
    }

    pub fn bulk_cost(&self, id: &str, amount: u64) -> Option<NumericValue> {
        self.state.producer(id).map(|p| p.bulk_cost(amount))
    }

    pub fn max_affordable(&self, id: &str) -> u64 {
        self.state
            .producer(id)
            .map_or(0, |p| p.max_affordable(self.state.amount(&p.resource_cost)))
    }

    /// Per-second output before boost and prestige bonuses.
    pub fn production(&self, id: &str) -> NumericValue {
        self.state
            .producer(id)
            .map_or(NumericValue::ZERO, |p| p.production())
    }

    pub fn can_afford_producer(&self, id: &str, amount: u64) -> bool {
        self.state.producer(id).is_some_and(|p| {
            p.unlocked && amount > 0 && self.state.amount(&p.resource_cost) >= p.bulk_cost(amount)
        })
    }

    pub fn can_afford_upgrade(&self, id: &str) -> bool {
        logic::can_purchase_upgrade(&self.state, id)
    }

    pub fn resource_rates(&self) -> BTreeMap<String, NumericValue> {
        self.state.resource_rates()
    }

    pub fn primary_rate(&self) -> NumericValue {
        self.state.primary_rate()
    }

    pub fn current_phase(&self) -> &str {
        &self.state.current_phase
    }

    /// Lifetime eggs needed for the next phase; `None` once all are unlocked.
    pub fn next_phase_threshold(&self) -> Option<NumericValue> {
        self.state.next_phase().map(|p| p.threshold)
    }

    pub fn phase_progress(&self) -> f64 {
        self.state.phase_progress()
    }

    pub fn prestige_preview(&self) -> NumericValue {
        logic::prestige_preview(&self.state)
    }

    pub fn auto_hatcher_cost(&self) -> NumericValue {
        logic::auto_hatcher_cost(self.state.auto_hatch_count)
    }

    pub fn achievement_progress(&self) -> AchievementProgress {
        self.state.achievements.progress()
    }
}
