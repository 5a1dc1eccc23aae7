//! Egg Empire game logic: actions, phase transitions, and the per-tick update.
//!
//! Every action validates fully before mutating, so an `Err` leaves the
//! state exactly as it was.

use rand::Rng;
use tracing::{debug, info};

use super::achievements;
use super::defs::{
    self, AUTO_HATCHER_BASE_COST, AUTO_HATCH_BASE_INTERVAL_SECS, CHICKEN, HATCH_COST,
    MAX_AUTO_HATCH_CYCLES_PER_TICK, MONEY, PRESTIGE_RESOURCE, PRIMARY_RESOURCE,
};
use super::formulas;
use super::state::{Effect, GameState, Requirement, SellKind};
use crate::error::ActionError;
use crate::numeric::NumericValue;

/// Advance the game by `dt` seconds. Returns newly unlocked achievement ids.
pub fn tick<R: Rng + ?Sized>(state: &mut GameState, dt: f64, rng: &mut R) -> Vec<String> {
    if !dt.is_finite() || dt <= 0.0 {
        return Vec::new();
    }
    produce(state, dt);
    run_auto_hatch(state, dt, rng);
    check_phase_unlocks(state);
    achievements::check(state)
}

fn produce(state: &mut GameState, dt: f64) {
    let seconds = NumericValue::from_f64(dt);
    for (id, rate) in state.resource_rates() {
        let gain = rate * seconds;
        if let Some(resource) = state.resources.get_mut(&id) {
            resource.add(gain);
        }
        if id == PRIMARY_RESOURCE {
            state.statistics.total_eggs_produced += gain;
        }
    }
}

fn run_auto_hatch<R: Rng + ?Sized>(state: &mut GameState, dt: f64, rng: &mut R) {
    if state.auto_hatch_count == 0 {
        return;
    }
    let interval = AUTO_HATCH_BASE_INTERVAL_SECS / state.auto_hatch_count as f64;
    state.auto_hatch_timer += dt;
    let due = (state.auto_hatch_timer / interval).floor();
    state.auto_hatch_timer = (state.auto_hatch_timer - due * interval).max(0.0);

    let due = due as u64;
    if due > MAX_AUTO_HATCH_CYCLES_PER_TICK {
        debug!(due, cap = MAX_AUTO_HATCH_CYCLES_PER_TICK, "dropping excess auto-hatch cycles");
    }
    for _ in 0..due.min(MAX_AUTO_HATCH_CYCLES_PER_TICK) {
        // Out of eggs: stop until the next tick.
        if hatch(state, rng).is_err() {
            break;
        }
    }
}

// ── Actions ───────────────────────────────────────────────

/// Manual click: add `click_power` to the primary resource.
pub fn click(state: &mut GameState) -> NumericValue {
    let power = state.click_power;
    if let Some(eggs) = state.resources.get_mut(PRIMARY_RESOURCE) {
        eggs.add(power);
    }
    state.total_clicks += 1;
    state.statistics.total_clicks += 1;
    state.statistics.total_eggs_produced += power;
    power
}

/// Deduct `cost` from `resource_id` or fail without change.
fn pay(state: &mut GameState, resource_id: &str, cost: NumericValue) -> Result<(), ActionError> {
    let resource = state
        .resources
        .get_mut(resource_id)
        .ok_or_else(|| ActionError::UnknownResource(resource_id.to_string()))?;
    if resource.subtract(cost) {
        Ok(())
    } else {
        Err(ActionError::Insufficient {
            resource: resource_id.to_string(),
            required: cost,
            available: resource.amount,
        })
    }
}

/// Buy `amount` units of a producer at the bulk price. Returns the price paid.
pub fn buy_producer(state: &mut GameState, id: &str, amount: u64) -> Result<NumericValue, ActionError> {
    let producer = state
        .producers
        .get(id)
        .ok_or_else(|| ActionError::UnknownProducer(id.to_string()))?;
    if !producer.unlocked {
        return Err(ActionError::ProducerLocked(id.to_string()));
    }
    if amount == 0 {
        return Err(ActionError::ZeroAmount);
    }
    let cost = producer.bulk_cost(amount);
    let pay_with = producer.resource_cost.clone();
    pay(state, &pay_with, cost)?;
    if let Some(producer) = state.producers.get_mut(id) {
        producer.owned = producer.owned.saturating_add(amount);
    }
    Ok(cost)
}

/// Buy as many units as the paying resource covers. Returns the count bought.
pub fn buy_max(state: &mut GameState, id: &str) -> Result<u64, ActionError> {
    let producer = state
        .producers
        .get(id)
        .ok_or_else(|| ActionError::UnknownProducer(id.to_string()))?;
    if !producer.unlocked {
        return Err(ActionError::ProducerLocked(id.to_string()));
    }
    let available = state.amount(&producer.resource_cost);
    let count = producer.max_affordable(available);
    if count == 0 {
        return Err(ActionError::Insufficient {
            resource: producer.resource_cost.clone(),
            required: producer.current_cost(),
            available,
        });
    }
    buy_producer(state, id, count)?;
    Ok(count)
}

fn requirement_met(state: &GameState, requirement: &Requirement) -> bool {
    match requirement {
        Requirement::OwnsProducer { producer, count } => {
            state.producer(producer).is_some_and(|p| p.owned >= *count)
        }
    }
}

/// Whether `buy_upgrade(id)` would succeed right now.
pub fn can_purchase_upgrade(state: &GameState, id: &str) -> bool {
    state.upgrade(id).is_some_and(|u| {
        u.unlocked
            && !u.purchased
            && u.requirement.as_ref().map_or(true, |r| requirement_met(state, r))
            && state.amount(&u.resource_cost) >= u.cost
    })
}

pub fn buy_upgrade(state: &mut GameState, id: &str) -> Result<(), ActionError> {
    let upgrade = state
        .upgrades
        .get(id)
        .ok_or_else(|| ActionError::UnknownUpgrade(id.to_string()))?;
    if !upgrade.unlocked {
        return Err(ActionError::UpgradeLocked(id.to_string()));
    }
    if upgrade.purchased {
        return Err(ActionError::AlreadyPurchased(id.to_string()));
    }
    if let Some(requirement) = &upgrade.requirement {
        if !requirement_met(state, requirement) {
            return Err(ActionError::RequirementUnmet(id.to_string()));
        }
    }
    let cost = upgrade.cost;
    let pay_with = upgrade.resource_cost.clone();
    let effect = upgrade.effect.clone();

    pay(state, &pay_with, cost)?;
    if let Some(upgrade) = state.upgrades.get_mut(id) {
        upgrade.purchased = true;
    }
    apply_effect(state, &effect);
    info!(upgrade = id, cost = %cost, "upgrade purchased");
    Ok(())
}

/// Apply an upgrade effect or achievement reward to the game state.
pub fn apply_effect(state: &mut GameState, effect: &Effect) {
    match effect {
        Effect::AddClickPower(amount) => {
            state.click_power += *amount;
        }
        Effect::MultiplyClickPower(factor) => {
            state.click_power *= *factor;
        }
        Effect::MultiplyProducer { producer, factor } => {
            if let Some(p) = state.producers.get_mut(producer) {
                p.apply_multiplier(*factor);
            }
        }
        Effect::MultiplyAllUnlocked(factor) => {
            for p in state.producers.values_mut().filter(|p| p.unlocked) {
                p.apply_multiplier(*factor);
            }
        }
        // Derived from purchased upgrades when read.
        Effect::MultiplySellPrice { .. } | Effect::AddHatchChance(_) => {}
    }
}

/// Spend one egg on a chance to gain a chicken. `Ok(true)` if it hatched.
///
/// With too few eggs this fails before touching `rng`.
pub fn hatch<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Result<bool, ActionError> {
    if !state.producers.contains_key(CHICKEN) {
        return Err(ActionError::UnknownProducer(CHICKEN.to_string()));
    }
    pay(state, PRIMARY_RESOURCE, NumericValue::from(HATCH_COST))?;
    let hatched = rng.random_bool(state.hatch_chance());
    if hatched {
        if let Some(chicken) = state.producers.get_mut(CHICKEN) {
            chicken.owned = chicken.owned.saturating_add(1);
        }
    }
    Ok(hatched)
}

/// Sell eggs or chickens for money. Returns the money gained.
pub fn sell(state: &mut GameState, kind: SellKind, amount: u64) -> Result<NumericValue, ActionError> {
    if amount == 0 {
        return Err(ActionError::ZeroAmount);
    }
    if !state.resources.contains_key(MONEY) {
        return Err(ActionError::UnknownResource(MONEY.to_string()));
    }
    let units = NumericValue::from(amount);
    match kind {
        SellKind::Eggs => pay(state, PRIMARY_RESOURCE, units)?,
        SellKind::Chickens => {
            let chicken = state
                .producers
                .get_mut(CHICKEN)
                .ok_or_else(|| ActionError::UnknownProducer(CHICKEN.to_string()))?;
            if chicken.owned < amount {
                return Err(ActionError::Insufficient {
                    resource: CHICKEN.to_string(),
                    required: units,
                    available: NumericValue::from(chicken.owned),
                });
            }
            chicken.owned -= amount;
        }
    }
    let gain = units * state.sell_price(kind);
    if let Some(money) = state.resources.get_mut(MONEY) {
        money.add(gain);
    }
    state.statistics.total_money_earned += gain;
    Ok(gain)
}

/// Money price of the next auto-hatcher.
pub fn auto_hatcher_cost(owned: u64) -> NumericValue {
    formulas::cost(
        NumericValue::from(AUTO_HATCHER_BASE_COST),
        defs::auto_hatcher_growth(),
        owned,
    )
}

pub fn buy_auto_hatcher(state: &mut GameState) -> Result<NumericValue, ActionError> {
    let cost = auto_hatcher_cost(state.auto_hatch_count);
    pay(state, MONEY, cost)?;
    state.auto_hatch_count += 1;
    Ok(cost)
}

// ── Phases ────────────────────────────────────────────────

/// Unlock every locked phase whose threshold the primary resource's lifetime
/// earnings have reached, lowest threshold first. Returns their ids.
pub fn check_phase_unlocks(state: &mut GameState) -> Vec<String> {
    let earned = state.primary().map_or(NumericValue::ZERO, |r| r.total_earned);
    let mut due: Vec<(NumericValue, String)> = state
        .phases
        .values()
        .filter(|p| !p.unlocked && p.threshold <= earned)
        .map(|p| (p.threshold, p.id.clone()))
        .collect();
    due.sort_by(|a, b| a.0.cmp(&b.0));

    let mut unlocked = Vec::new();
    for (_, id) in due {
        if unlock_phase(state, &id) {
            unlocked.push(id);
        }
    }
    unlocked
}

/// Unlock a phase and cascade to its producers and upgrades.
/// `false` if unknown or already unlocked.
pub fn unlock_phase(state: &mut GameState, id: &str) -> bool {
    let Some(phase) = state.phases.get_mut(id) else {
        return false;
    };
    if phase.unlocked {
        return false;
    }
    phase.unlocked = true;
    let initial = phase.threshold.is_zero();
    state.current_phase = id.to_string();
    cascade_phase(state, id);

    if !initial {
        let t = state.total_play_time;
        let best = &mut state.statistics.fastest_phase_unlock;
        if *best == 0.0 || t < *best {
            *best = t;
        }
        info!(phase = id, play_time = t, "phase unlocked");
    }
    true
}

/// Mark a phase's producers and upgrades unlocked. Idempotent.
pub fn cascade_phase(state: &mut GameState, id: &str) {
    let Some(phase) = state.phases.get(id) else {
        return;
    };
    let producers = phase.producers.clone();
    let upgrades = phase.upgrades.clone();
    for pid in &producers {
        if let Some(p) = state.producers.get_mut(pid) {
            p.unlock();
        }
    }
    for uid in &upgrades {
        if let Some(u) = state.upgrades.get_mut(uid) {
            u.unlocked = true;
        }
    }
}

/// Re-run the cascade for every unlocked phase.
pub fn recascade_unlocked(state: &mut GameState) {
    let unlocked: Vec<String> = state
        .phases
        .values()
        .filter(|p| p.unlocked)
        .map(|p| p.id.clone())
        .collect();
    for id in unlocked {
        cascade_phase(state, &id);
    }
}

/// Unlock every zero-threshold phase (the start of a run).
pub fn unlock_initial_phase(state: &mut GameState) {
    let initial: Vec<String> = state
        .phases
        .values()
        .filter(|p| p.threshold.is_zero())
        .map(|p| p.id.clone())
        .collect();
    for id in initial {
        unlock_phase(state, &id);
    }
}

// ── Prestige ──────────────────────────────────────────────

/// Prestige currency a reset would grant right now.
pub fn prestige_preview(state: &GameState) -> NumericValue {
    formulas::prestige_gain(state.primary().map_or(NumericValue::ZERO, |r| r.total_earned))
}

/// Reset the run for prestige currency. Returns the amount gained.
///
/// Achievements stay unlocked and are not rewarded again.
pub fn prestige(state: &mut GameState) -> Result<NumericValue, ActionError> {
    let gain = prestige_preview(state);
    if !gain.is_positive() {
        return Err(ActionError::NothingToPrestige);
    }
    if !state.resources.contains_key(PRESTIGE_RESOURCE) {
        return Err(ActionError::UnknownResource(PRESTIGE_RESOURCE.to_string()));
    }

    for resource in state.resources.values_mut() {
        if resource.id != PRESTIGE_RESOURCE {
            resource.hard_reset();
        }
    }
    if let Some(currency) = state.resources.get_mut(PRESTIGE_RESOURCE) {
        currency.add(gain);
    }
    for producer in state.producers.values_mut() {
        producer.owned = 0;
        producer.set_multiplier(NumericValue::ONE);
        producer.unlocked = false;
    }
    for upgrade in state.upgrades.values_mut() {
        upgrade.purchased = false;
        upgrade.unlocked = false;
    }
    for phase in state.phases.values_mut() {
        phase.unlocked = false;
    }
    state.current_phase = defs::INITIAL_PHASE.to_string();
    state.click_power = NumericValue::ONE;
    state.auto_hatch_count = 0;
    state.auto_hatch_timer = 0.0;
    state.statistics.prestige_count += 1;
    unlock_initial_phase(state);

    info!(
        gain = %gain,
        prestige_count = state.statistics.prestige_count,
        "prestige reset"
    );
    Ok(gain)
}
