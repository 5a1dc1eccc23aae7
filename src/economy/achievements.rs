//! Achievement table and the at-most-once evaluator.
//!
//! Definitions are static; per-game progress lives in [`AchievementTracker`]
//! inside `GameState`. A reward is applied only when its `reward_applied`
//! flag is still clear, so neither re-checking nor restoring a save can pay
//! it twice.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use tracing::{debug, info};

use super::defs::{CHICKEN, PRIMARY_RESOURCE};
use super::logic;
use super::state::{Effect, GameState};
use crate::numeric::NumericValue;

/// Predicate over game state that unlocks an achievement.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    TotalClicks(u64),
    TotalEarned { resource: String, amount: NumericValue },
    ProducerOwned { producer: String, count: u64 },
    /// Primary-resource output per second, bonuses included.
    ProductionPerSecond(NumericValue),
}

impl Condition {
    pub fn is_met(&self, state: &GameState) -> bool {
        match self {
            Condition::TotalClicks(n) => state.total_clicks >= *n,
            Condition::TotalEarned { resource, amount } => state
                .resource(resource)
                .is_some_and(|r| r.total_earned >= *amount),
            Condition::ProducerOwned { producer, count } => state
                .producer(producer)
                .is_some_and(|p| p.owned >= *count),
            Condition::ProductionPerSecond(rate) => state.primary_rate() >= *rate,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub reward_text: &'static str,
    pub condition: Condition,
    pub reward: Effect,
}

/// Per-game unlock and reward flags. Both are terminal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AchievementTracker {
    unlocked: BTreeSet<String>,
    reward_applied: BTreeSet<String>,
}

/// Snapshot for progress displays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AchievementProgress {
    pub unlocked: usize,
    pub total: usize,
    pub percentage: f64,
}

impl AchievementTracker {
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    pub fn is_reward_applied(&self, id: &str) -> bool {
        self.reward_applied.contains(id)
    }

    /// Unlocked ids in declaration order.
    pub fn unlocked_ids(&self) -> Vec<String> {
        definitions()
            .iter()
            .filter(|a| self.is_unlocked(a.id))
            .map(|a| a.id.to_string())
            .collect()
    }

    /// Ids whose reward has been applied, in declaration order.
    pub fn rewarded_ids(&self) -> Vec<String> {
        definitions()
            .iter()
            .filter(|a| self.is_reward_applied(a.id))
            .map(|a| a.id.to_string())
            .collect()
    }

    pub fn progress(&self) -> AchievementProgress {
        let total = definitions().len();
        let unlocked = self.unlocked_ids().len();
        let percentage = if total > 0 {
            unlocked as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        AchievementProgress {
            unlocked,
            total,
            percentage,
        }
    }

    fn mark_unlocked(&mut self, id: &str) {
        self.unlocked.insert(id.to_string());
    }

    fn mark_rewarded(&mut self, id: &str) {
        self.reward_applied.insert(id.to_string());
    }
}

/// Evaluate every locked achievement in declaration order.
/// Returns the ids unlocked by this call.
pub fn check(state: &mut GameState) -> Vec<String> {
    let mut newly = Vec::new();
    for achievement in definitions() {
        if state.achievements.is_unlocked(achievement.id) {
            continue;
        }
        if !achievement.condition.is_met(state) {
            continue;
        }
        state.achievements.mark_unlocked(achievement.id);
        info!(id = achievement.id, reward = achievement.reward_text, "achievement unlocked");
        grant_reward(state, achievement);
        newly.push(achievement.id.to_string());
    }
    newly
}

/// Mark saved achievements unlocked without re-running their conditions.
///
/// `rewarded` lists the ids whose reward is already reflected in the
/// restored state. `None` (saves written before that list existed) means
/// every listed id is treated as rewarded.
pub fn restore(state: &mut GameState, ids: &[String], rewarded: Option<&[String]>) {
    for id in ids {
        let Some(achievement) = find(id) else {
            debug!(id = %id, "ignoring unknown achievement in save");
            continue;
        };
        state.achievements.mark_unlocked(achievement.id);
        let accounted = rewarded.map_or(true, |list| list.iter().any(|r| r == id));
        if accounted {
            state.achievements.mark_rewarded(achievement.id);
        } else {
            grant_reward(state, achievement);
        }
    }
}

fn grant_reward(state: &mut GameState, achievement: &Achievement) {
    if state.achievements.is_reward_applied(achievement.id) {
        return;
    }
    logic::apply_effect(state, &achievement.reward);
    state.achievements.mark_rewarded(achievement.id);
}

pub fn find(id: &str) -> Option<&'static Achievement> {
    definitions().iter().find(|a| a.id == id)
}

/// The achievement table, in evaluation order.
pub fn definitions() -> &'static [Achievement] {
    static TABLE: OnceLock<Vec<Achievement>> = OnceLock::new();
    TABLE.get_or_init(build_table)
}

fn build_table() -> Vec<Achievement> {
    let clicks = |id, name, description, reward_text, count, power: u64| Achievement {
        id,
        name,
        description,
        reward_text,
        condition: Condition::TotalClicks(count),
        reward: Effect::AddClickPower(NumericValue::from(power)),
    };
    let earned = |id, name, description, reward_text, amount: u64, factor: i64| Achievement {
        id,
        name,
        description,
        reward_text,
        condition: Condition::TotalEarned {
            resource: PRIMARY_RESOURCE.to_string(),
            amount: NumericValue::from(amount),
        },
        reward: Effect::MultiplyAllUnlocked(NumericValue::from_scaled(factor, 2)),
    };
    let owned = |id, name, description, reward_text, producer: &str, count, reward| Achievement {
        id,
        name,
        description,
        reward_text,
        condition: Condition::ProducerOwned {
            producer: producer.to_string(),
            count,
        },
        reward,
    };
    let rate = |id, name, description, reward_text, per_sec: u64, factor: i64| Achievement {
        id,
        name,
        description,
        reward_text,
        condition: Condition::ProductionPerSecond(NumericValue::from(per_sec)),
        reward: Effect::MultiplyAllUnlocked(NumericValue::from_scaled(factor, 2)),
    };
    let chicken_bonus = |factor: i64| Effect::MultiplyProducer {
        producer: CHICKEN.to_string(),
        factor: NumericValue::from_scaled(factor, 2),
    };
    let all_bonus = |factor: i64| Effect::MultiplyAllUnlocked(NumericValue::from_scaled(factor, 2));

    vec![
        clicks("first_tap", "First Tap", "Click the egg 10 times", "+1 Click Power", 10, 1),
        clicks("tapper", "Tapper", "Click the egg 100 times", "+5 Click Power", 100, 5),
        clicks("click_machine", "Click Machine", "Click the egg 1,000 times", "+25 Click Power", 1_000, 25),
        clicks("carpal_tunnel", "Carpal Tunnel", "Click the egg 10,000 times", "+100 Click Power", 10_000, 100),
        earned("dozen", "Dozen", "Collect 12 eggs", "+5% Production", 12, 105),
        earned("hundred", "Hundred", "Collect 100 eggs", "+10% Production", 100, 110),
        earned("thousand", "Thousand", "Collect 1,000 eggs", "+15% Production", 1_000, 115),
        earned("millionaire", "Millionaire", "Collect 1,000,000 eggs", "+25% Production", 1_000_000, 125),
        earned("billionaire", "Billionaire", "Collect 1,000,000,000 eggs", "+50% Production", 1_000_000_000, 150),
        owned("first_chicken", "First Chicken", "Own 1 chicken", "+2% Chicken Production", CHICKEN, 1, chicken_bonus(102)),
        owned("flock", "Flock", "Own 10 chickens", "+10% Chicken Production", CHICKEN, 10, chicken_bonus(110)),
        owned("empire", "Empire", "Own 50 chickens", "+25% Chicken Production", CHICKEN, 50, chicken_bonus(125)),
        owned("first_coop", "First Coop", "Own 1 coop", "+5% All Production", "coop", 1, all_bonus(105)),
        owned("industrialist", "Industrialist", "Own 1 incubator", "+10% All Production", "incubator", 1, all_bonus(110)),
        rate("egg_per_sec_club", "Egg/sec Club", "Produce 1 egg per second", "+3% Production", 1, 103),
        rate("speed_demon", "Speed Demon", "Produce 100 eggs per second", "+10% Production", 100, 110),
        rate("egg_storm", "Egg Storm", "Produce 10,000 eggs per second", "+20% Production", 10_000, 120),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(s: &str) -> NumericValue {
        s.parse().unwrap()
    }

    #[test]
    fn table_has_seventeen_unique_ids() {
        let ids: BTreeSet<&str> = definitions().iter().map(|a| a.id).collect();
        assert_eq!(definitions().len(), 17);
        assert_eq!(ids.len(), 17);
    }

    #[test]
    fn display_names() {
        let name = |id: &str| definitions().iter().find(|a| a.id == id).map(|a| a.name);
        assert_eq!(name("hundred"), Some("Hundred"));
        assert_eq!(name("thousand"), Some("Thousand"));
        assert_eq!(name("millionaire"), Some("Millionaire"));
        assert_eq!(name("billionaire"), Some("Billionaire"));
        assert_eq!(name("empire"), Some("Empire"));
        assert_eq!(name("first_coop"), Some("First Coop"));
    }

    #[test]
    fn first_tap_rewards_once() {
        let mut state = GameState::new();
        state.total_clicks = 10;
        let unlocked = check(&mut state);
        assert_eq!(unlocked, vec!["first_tap".to_string()]);
        assert_eq!(state.click_power, n("2"));

        let again = check(&mut state);
        assert!(again.is_empty());
        assert_eq!(state.click_power, n("2"));
    }

    #[test]
    fn multiple_unlock_in_declaration_order() {
        let mut state = GameState::new();
        state.total_clicks = 100;
        state.resources.get_mut(PRIMARY_RESOURCE).unwrap().add(n("150"));
        let unlocked = check(&mut state);
        assert_eq!(unlocked, vec!["first_tap", "tapper", "dozen", "hundred"]);
        assert_eq!(state.click_power, n("7"));
    }

    #[test]
    fn earned_reward_multiplies_unlocked_producers_only() {
        let mut state = GameState::new();
        state.resources.get_mut(PRIMARY_RESOURCE).unwrap().add(n("12"));
        check(&mut state);
        assert_eq!(state.producer(CHICKEN).unwrap().multiplier, n("1.05"));
        assert_eq!(state.producer("incubator").unwrap().multiplier, NumericValue::ONE);
    }

    #[test]
    fn restore_without_reward_list_skips_rewards() {
        let mut state = GameState::new();
        restore(&mut state, &["first_tap".to_string()], None);
        assert!(state.achievements.is_unlocked("first_tap"));
        assert!(state.achievements.is_reward_applied("first_tap"));
        assert_eq!(state.click_power, NumericValue::ONE);
    }

    #[test]
    fn restore_applies_unaccounted_rewards() {
        let mut state = GameState::new();
        let ids = vec!["first_tap".to_string(), "tapper".to_string()];
        let rewarded = vec!["first_tap".to_string()];
        restore(&mut state, &ids, Some(&rewarded));
        // Only tapper's +5 is new.
        assert_eq!(state.click_power, n("6"));
        assert!(state.achievements.is_reward_applied("tapper"));
    }

    #[test]
    fn restore_ignores_unknown_ids() {
        let mut state = GameState::new();
        restore(&mut state, &["no_such_thing".to_string()], None);
        assert_eq!(state.achievements.progress().unlocked, 0);
    }

    #[test]
    fn restored_achievements_are_not_rechecked() {
        let mut state = GameState::new();
        restore(&mut state, &["first_tap".to_string()], None);
        state.total_clicks = 10;
        assert!(check(&mut state).is_empty());
        assert_eq!(state.click_power, NumericValue::ONE);
    }

    #[test]
    fn production_condition_reads_primary_rate() {
        let mut state = GameState::new();
        state.producers.get_mut(CHICKEN).unwrap().owned = 10;
        let unlocked = check(&mut state);
        assert!(unlocked.contains(&"egg_per_sec_club".to_string()));
        assert!(unlocked.contains(&"flock".to_string()));
    }

    #[test]
    fn progress_percentage() {
        let mut state = GameState::new();
        state.total_clicks = 10;
        check(&mut state);
        let p = state.achievements.progress();
        assert_eq!(p.unlocked, 1);
        assert_eq!(p.total, 17);
        assert!((p.percentage - 100.0 / 17.0).abs() < 0.001);
    }
}
