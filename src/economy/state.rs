//! Egg Empire entity types and the `GameState` aggregate.

use std::collections::BTreeMap;

use super::achievements::AchievementTracker;
use super::defs;
use super::formulas;
use crate::numeric::NumericValue;

/// A spendable quantity (eggs, money, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub amount: NumericValue,
    /// Lifetime earnings; only [`Resource::add`] increases it.
    pub total_earned: NumericValue,
    pub display_order: u32,
}

impl Resource {
    pub fn new(id: &str, name: &str, display_order: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            amount: NumericValue::ZERO,
            total_earned: NumericValue::ZERO,
            display_order,
        }
    }

    /// Credit `value`. Non-positive values are ignored.
    pub fn add(&mut self, value: NumericValue) {
        if !value.is_positive() {
            return;
        }
        self.amount += value;
        self.total_earned += value;
    }

    /// Debit `value`; `false` (and no change) when it exceeds `amount`.
    pub fn subtract(&mut self, value: NumericValue) -> bool {
        if value > self.amount {
            return false;
        }
        self.amount -= value;
        true
    }

    pub fn can_afford(&self, value: NumericValue) -> bool {
        self.amount >= value
    }

    /// Soft reset: keeps lifetime earnings.
    pub fn reset(&mut self) {
        self.amount = NumericValue::ZERO;
    }

    pub fn hard_reset(&mut self) {
        self.amount = NumericValue::ZERO;
        self.total_earned = NumericValue::ZERO;
    }
}

/// Where a producer's output goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProducerOutput {
    /// Adds directly to the named resource.
    Resource(String),
    /// Feeds the multiplicative boost on primary-resource output.
    Boost,
}

/// An automated generator bought with a resource.
#[derive(Clone, Debug, PartialEq)]
pub struct Producer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_cost: NumericValue,
    pub base_production: NumericValue,
    /// Cost growth per owned unit, always > 1.
    pub growth_rate: NumericValue,
    pub owned: u64,
    pub output: ProducerOutput,
    /// Resource id paid when buying.
    pub resource_cost: String,
    pub unlocked: bool,
    /// Cumulative upgrade/achievement multiplier, >= 1.
    pub multiplier: NumericValue,
}

impl Producer {
    pub fn current_cost(&self) -> NumericValue {
        formulas::cost(self.base_cost, self.growth_rate, self.owned)
    }

    pub fn bulk_cost(&self, amount: u64) -> NumericValue {
        formulas::bulk_cost(self.base_cost, self.growth_rate, self.owned, amount)
    }

    pub fn max_affordable(&self, available: NumericValue) -> u64 {
        formulas::max_affordable(self.base_cost, self.growth_rate, self.owned, available)
    }

    /// Output per second before boost and prestige bonuses.
    pub fn production(&self) -> NumericValue {
        formulas::production(self.base_production, self.owned, self.multiplier)
    }

    pub fn apply_multiplier(&mut self, factor: NumericValue) {
        self.multiplier *= factor;
    }

    /// Direct overwrite, for restoring saves and prestige resets only.
    pub fn set_multiplier(&mut self, multiplier: NumericValue) {
        self.multiplier = multiplier;
    }

    pub fn unlock(&mut self) {
        self.unlocked = true;
    }
}

/// What can be sold for money.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SellKind {
    Eggs,
    Chickens,
}

/// What an upgrade or achievement reward does when applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    AddClickPower(NumericValue),
    MultiplyClickPower(NumericValue),
    MultiplyProducer {
        producer: String,
        factor: NumericValue,
    },
    /// Multiplies every producer unlocked at application time.
    MultiplyAllUnlocked(NumericValue),
    /// Read on demand from purchased upgrades, never stored.
    MultiplySellPrice { kind: SellKind, factor: NumericValue },
    /// Read on demand from purchased upgrades, never stored.
    AddHatchChance(f64),
}

/// Extra gate on an upgrade beyond its phase being unlocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    OwnsProducer { producer: String, count: u64 },
}

/// A one-time purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct Upgrade {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: NumericValue,
    pub resource_cost: String,
    pub purchased: bool,
    pub unlocked: bool,
    pub effect: Effect,
    pub requirement: Option<Requirement>,
}

/// A progression tier gated on lifetime primary-resource earnings.
#[derive(Clone, Debug, PartialEq)]
pub struct Phase {
    pub id: String,
    pub name: String,
    pub description: String,
    pub unlocked: bool,
    pub threshold: NumericValue,
    pub producers: Vec<String>,
    pub upgrades: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    pub total_eggs_produced: NumericValue,
    pub total_clicks: u64,
    pub total_money_earned: NumericValue,
    pub prestige_count: u64,
    /// Lowest play time (s) at which a later phase unlocked; 0 until then.
    pub fastest_phase_unlock: f64,
}

/// Every entity of a running game. Nothing outside holds references into it.
#[derive(Clone, Debug)]
pub struct GameState {
    pub resources: BTreeMap<String, Resource>,
    pub producers: BTreeMap<String, Producer>,
    pub upgrades: BTreeMap<String, Upgrade>,
    pub phases: BTreeMap<String, Phase>,
    pub achievements: AchievementTracker,
    pub current_phase: String,
    pub total_clicks: u64,
    pub click_power: NumericValue,
    /// Wall-clock ms of the last save or load.
    pub last_save_time: u64,
    /// Frame-clock ms of the last scheduler frame.
    pub last_tick_time: f64,
    /// Seconds of capped frame time played.
    pub total_play_time: f64,
    pub auto_hatch_count: u64,
    pub auto_hatch_timer: f64,
    pub statistics: Statistics,
}

impl GameState {
    /// Fresh game: all tables loaded, the zero-threshold phase unlocked.
    pub fn new() -> Self {
        let mut state = Self {
            resources: keyed(defs::resources(), |r| r.id.clone()),
            producers: keyed(defs::producers(), |p| p.id.clone()),
            upgrades: keyed(defs::upgrades(), |u| u.id.clone()),
            phases: keyed(defs::phases(), |p| p.id.clone()),
            achievements: AchievementTracker::default(),
            current_phase: defs::INITIAL_PHASE.to_string(),
            total_clicks: 0,
            click_power: NumericValue::ONE,
            last_save_time: 0,
            last_tick_time: 0.0,
            total_play_time: 0.0,
            auto_hatch_count: 0,
            auto_hatch_timer: 0.0,
            statistics: Statistics::default(),
        };
        super::logic::unlock_initial_phase(&mut state);
        state
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn producer(&self, id: &str) -> Option<&Producer> {
        self.producers.get(id)
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.get(id)
    }

    pub fn phase(&self, id: &str) -> Option<&Phase> {
        self.phases.get(id)
    }

    /// Amount held of `id`, zero if unknown.
    pub fn amount(&self, id: &str) -> NumericValue {
        self.resources.get(id).map_or(NumericValue::ZERO, |r| r.amount)
    }

    pub fn primary(&self) -> Option<&Resource> {
        self.resources.get(defs::PRIMARY_RESOURCE)
    }

    fn purchased_effects(&self) -> impl Iterator<Item = &Effect> {
        self.upgrades
            .values()
            .filter(|u| u.purchased)
            .map(|u| &u.effect)
    }

    /// Product of purchased sell-price factors for `kind`.
    pub fn sell_price_multiplier(&self, kind: SellKind) -> NumericValue {
        self.purchased_effects()
            .filter_map(|e| match e {
                Effect::MultiplySellPrice { kind: k, factor } if *k == kind => Some(*factor),
                _ => None,
            })
            .fold(NumericValue::ONE, |acc, f| acc * f)
    }

    /// Money paid per unit of `kind`.
    pub fn sell_price(&self, kind: SellKind) -> NumericValue {
        let base = match kind {
            SellKind::Eggs => defs::EGG_SELL_PRICE,
            SellKind::Chickens => defs::CHICKEN_SELL_PRICE,
        };
        NumericValue::from(base) * self.sell_price_multiplier(kind)
    }

    /// Manual hatch success probability, at most 1.
    pub fn hatch_chance(&self) -> f64 {
        let bonus: f64 = self
            .purchased_effects()
            .filter_map(|e| match e {
                Effect::AddHatchChance(b) => Some(*b),
                _ => None,
            })
            .sum();
        (defs::HATCH_SUCCESS_RATE + bonus).clamp(0.0, 1.0)
    }

    /// Summed output of unlocked boost producers.
    pub fn boost(&self) -> NumericValue {
        self.producers
            .values()
            .filter(|p| p.unlocked && p.output == ProducerOutput::Boost)
            .map(Producer::production)
            .sum()
    }

    pub fn prestige_multiplier(&self) -> NumericValue {
        formulas::prestige_multiplier(self.amount(defs::PRESTIGE_RESOURCE))
    }

    /// Per-second gain of every produced resource, bonuses included.
    pub fn resource_rates(&self) -> BTreeMap<String, NumericValue> {
        let mut rates: BTreeMap<String, NumericValue> = BTreeMap::new();
        for producer in self.producers.values().filter(|p| p.unlocked) {
            if let ProducerOutput::Resource(target) = &producer.output {
                *rates.entry(target.clone()).or_default() += producer.production();
            }
        }
        if let Some(primary) = rates.get_mut(defs::PRIMARY_RESOURCE) {
            *primary = *primary * (NumericValue::ONE + self.boost()) * self.prestige_multiplier();
        }
        rates
    }

    pub fn primary_rate(&self) -> NumericValue {
        self.resource_rates()
            .get(defs::PRIMARY_RESOURCE)
            .copied()
            .unwrap_or_default()
    }

    /// Next locked phase by threshold, if any.
    pub fn next_phase(&self) -> Option<&Phase> {
        self.phases
            .values()
            .filter(|p| !p.unlocked)
            .min_by(|a, b| a.threshold.cmp(&b.threshold))
    }

    /// Percent of the way to the next phase threshold, capped at 100.
    /// 100 when every phase is unlocked.
    pub fn phase_progress(&self) -> f64 {
        let Some(next) = self.next_phase() else {
            return 100.0;
        };
        let earned = self.primary().map_or(NumericValue::ZERO, |r| r.total_earned);
        if !next.threshold.is_positive() {
            return 100.0;
        }
        let ratio = (earned / next.threshold).to_f64() * 100.0;
        ratio.clamp(0.0, 100.0)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

fn keyed<T>(items: Vec<T>, id: impl Fn(&T) -> String) -> BTreeMap<String, T> {
    items.into_iter().map(|item| (id(&item), item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> NumericValue {
        s.parse().unwrap()
    }

    #[test]
    fn resource_add_tracks_lifetime() {
        let mut r = Resource::new("eggs", "Eggs", 1);
        r.add(n("5"));
        assert!(r.subtract(n("3")));
        assert_eq!(r.amount, n("2"));
        assert_eq!(r.total_earned, n("5"));
    }

    #[test]
    fn resource_subtract_overdraft_is_noop() {
        let mut r = Resource::new("eggs", "Eggs", 1);
        r.add(n("2"));
        assert!(!r.subtract(n("2.5")));
        assert_eq!(r.amount, n("2"));
    }

    #[test]
    fn resource_add_ignores_negative() {
        let mut r = Resource::new("eggs", "Eggs", 1);
        r.add(n("-4"));
        assert_eq!(r.amount, NumericValue::ZERO);
        assert_eq!(r.total_earned, NumericValue::ZERO);
    }

    #[test]
    fn resource_resets() {
        let mut r = Resource::new("eggs", "Eggs", 1);
        r.add(n("10"));
        r.reset();
        assert_eq!(r.amount, NumericValue::ZERO);
        assert_eq!(r.total_earned, n("10"));
        r.hard_reset();
        assert_eq!(r.total_earned, NumericValue::ZERO);
    }

    #[test]
    fn new_state_unlocks_only_initial_phase() {
        let state = GameState::new();
        assert_eq!(state.current_phase, defs::INITIAL_PHASE);
        let unlocked: Vec<&str> = state
            .phases
            .values()
            .filter(|p| p.unlocked)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(unlocked, vec![defs::INITIAL_PHASE]);
        assert!(state.producer("chicken").unwrap().unlocked);
        assert!(!state.producer("incubator").unwrap().unlocked);
        assert!(state.upgrade("better_hands").unwrap().unlocked);
    }

    #[test]
    fn tables_have_expected_sizes() {
        let state = GameState::new();
        assert_eq!(state.resources.len(), 4);
        assert_eq!(state.producers.len(), 16);
        assert_eq!(state.phases.len(), 4);
        for phase in state.phases.values() {
            assert_eq!(phase.producers.len(), 4, "{}", phase.id);
            for id in phase.producers.iter() {
                assert!(state.producers.contains_key(id), "{id}");
            }
            for id in phase.upgrades.iter() {
                assert!(state.upgrades.contains_key(id), "{id}");
            }
        }
    }

    #[test]
    fn rates_apply_boost_to_primary_only() {
        let mut state = GameState::new();
        state.producers.get_mut("chicken").unwrap().owned = 10;
        state.producers.get_mut("feed_optimizer").unwrap().owned = 2;
        // 10 * 0.1 = 1 egg/s, boosted by 2 * 0.05
        assert!(state.primary_rate().approx_eq(n("1.1"), 1e-20));
    }

    #[test]
    fn prestige_currency_scales_primary_rate() {
        let mut state = GameState::new();
        state.producers.get_mut("chicken").unwrap().owned = 10;
        state
            .resources
            .get_mut(defs::PRESTIGE_RESOURCE)
            .unwrap()
            .add(n("5"));
        assert!(state.primary_rate().approx_eq(n("1.5"), 1e-20));
    }

    #[test]
    fn locked_producers_do_not_produce() {
        let mut state = GameState::new();
        state.producers.get_mut("factory").unwrap().owned = 3;
        assert_eq!(state.primary_rate(), NumericValue::ZERO);
    }

    #[test]
    fn sell_price_reads_purchased_upgrades() {
        let mut state = GameState::new();
        assert_eq!(state.sell_price(SellKind::Eggs), NumericValue::ONE);
        state.upgrades.get_mut("organic_label").unwrap().purchased = true;
        assert_eq!(state.sell_price(SellKind::Eggs), n("2"));
        assert_eq!(state.sell_price(SellKind::Chickens), n("50"));
    }

    #[test]
    fn hatch_chance_reads_purchased_upgrades() {
        let mut state = GameState::new();
        assert!((state.hatch_chance() - 0.3).abs() < 0.001);
        state.upgrades.get_mut("heat_lamps").unwrap().purchased = true;
        assert!((state.hatch_chance() - 0.35).abs() < 0.001);
    }

    #[test]
    fn phase_progress_toward_industrial() {
        let mut state = GameState::new();
        state
            .resources
            .get_mut(defs::PRIMARY_RESOURCE)
            .unwrap()
            .add(n("25000"));
        assert!((state.phase_progress() - 50.0).abs() < 0.001);
        assert_eq!(state.next_phase().unwrap().id, "industrial");
    }

    #[test]
    fn phase_progress_full_when_all_unlocked() {
        let mut state = GameState::new();
        for phase in state.phases.values_mut() {
            phase.unlocked = true;
        }
        assert_eq!(state.phase_progress(), 100.0);
    }
}
