//! Static balance tables: resources, producers, upgrades, phases.

use super::state::{Effect, Phase, Producer, ProducerOutput, Requirement, Resource, SellKind, Upgrade};
use crate::numeric::NumericValue;

/// Resource whose lifetime earnings gate phases and prestige.
pub const PRIMARY_RESOURCE: &str = "eggs";
pub const MONEY: &str = "money";
pub const RESEARCH: &str = "research";
/// Prestige currency; survives resets.
pub const PRESTIGE_RESOURCE: &str = "cosmic_eggs";

/// Producer that hatching and chicken sales act on.
pub const CHICKEN: &str = "chicken";

/// Phase unlocked at the start of every run.
pub const INITIAL_PHASE: &str = "artisanal";

/// Eggs consumed per hatch attempt.
pub const HATCH_COST: u64 = 1;
pub const HATCH_SUCCESS_RATE: f64 = 0.3;
pub const HATCH_CHANCE_PER_UPGRADE: f64 = 0.05;

/// Base money per egg / per chicken sold.
pub const EGG_SELL_PRICE: u64 = 1;
pub const CHICKEN_SELL_PRICE: u64 = 50;

/// Seconds between auto-hatches with one auto-hatcher; divided by the count.
pub const AUTO_HATCH_BASE_INTERVAL_SECS: f64 = 5.0;
/// Catch-up hatches processed per tick at most; the rest are dropped.
pub const MAX_AUTO_HATCH_CYCLES_PER_TICK: u64 = 100;
/// Money cost of the first auto-hatcher; grows by 1.5x per owned.
pub const AUTO_HATCHER_BASE_COST: u64 = 100;

pub fn auto_hatcher_growth() -> NumericValue {
    NumericValue::from_scaled(15, 1)
}

// ── Resources ─────────────────────────────────────────────

pub fn resources() -> Vec<Resource> {
    vec![
        Resource::new(PRIMARY_RESOURCE, "Eggs", 1),
        Resource::new(MONEY, "Money", 2),
        Resource::new(RESEARCH, "Research", 3),
        Resource::new(PRESTIGE_RESOURCE, "Cosmic Eggs", 4),
    ]
}

// ── Producers ─────────────────────────────────────────────

struct ProducerDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    base_cost: u64,
    /// `base_production` as (digits, decimal scale).
    production: (i64, u32),
    /// Growth rate in hundredths, e.g. 115 = 1.15.
    growth: i64,
    output: Option<&'static str>,
    cost_in: &'static str,
}

const PRODUCERS: &[ProducerDef] = &[
    // Artisanal
    ProducerDef {
        id: CHICKEN,
        name: "Chicken",
        description: "A humble chicken that lays eggs",
        base_cost: 10,
        production: (1, 1),
        growth: 115,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "coop",
        name: "Coop",
        description: "House more chickens",
        base_cost: 50,
        production: (1, 0),
        growth: 115,
        output: Some(PRIMARY_RESOURCE),
        cost_in: MONEY,
    },
    ProducerDef {
        id: "farm",
        name: "Farm",
        description: "Large scale egg production",
        base_cost: 500,
        production: (8, 0),
        growth: 115,
        output: Some(PRIMARY_RESOURCE),
        cost_in: MONEY,
    },
    // Each unit adds 5% to all egg output.
    ProducerDef {
        id: "feed_optimizer",
        name: "Feed Optimizer",
        description: "Better nutrition, more eggs",
        base_cost: 2_500,
        production: (5, 2),
        growth: 115,
        output: None,
        cost_in: MONEY,
    },
    // Industrial
    ProducerDef {
        id: "incubator",
        name: "Incubator",
        description: "Mass-produce chickens efficiently",
        base_cost: 50_000,
        production: (500, 0),
        growth: 115,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "factory",
        name: "Factory",
        description: "Automated egg production at scale",
        base_cost: 500_000,
        production: (5_000, 0),
        growth: 115,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "conveyor_belt",
        name: "Conveyor Belt",
        description: "Continuous flow production line",
        base_cost: 5_000_000,
        production: (50_000, 0),
        growth: 114,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "mega_facility",
        name: "Mega Facility",
        description: "Industrial complex dominating the landscape",
        base_cost: 50_000_000,
        production: (500_000, 0),
        growth: 113,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    // Biotech
    ProducerDef {
        id: "dna_sequencer",
        name: "DNA Sequencer",
        description: "Unlock the secrets of perfect eggs",
        base_cost: 500_000_000,
        production: (5_000_000, 0),
        growth: 116,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "gene_lab",
        name: "Gene Lab",
        description: "Engineer superior egg-laying organisms",
        base_cost: 5_000_000_000,
        production: (50_000_000, 0),
        growth: 115,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "bioprinter",
        name: "Bioprinter",
        description: "Print chickens molecule by molecule",
        base_cost: 50_000_000_000,
        production: (500_000_000, 0),
        growth: 114,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "evolution_chamber",
        name: "Evolution Chamber",
        description: "Accelerate millions of years in seconds",
        base_cost: 500_000_000_000,
        production: (5_000_000_000, 0),
        growth: 117,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    // Cosmic
    ProducerDef {
        id: "space_station",
        name: "Space Station",
        description: "Zero-gravity egg production",
        base_cost: 5_000_000_000_000,
        production: (50_000_000_000, 0),
        growth: 118,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "moon_colony",
        name: "Moon Colony",
        description: "Lunar farms stretch across craters",
        base_cost: 50_000_000_000_000,
        production: (500_000_000_000, 0),
        growth: 116,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "dyson_sphere",
        name: "Dyson Sphere",
        description: "Harness a star to power egg production",
        base_cost: 500_000_000_000_000,
        production: (5_000_000_000_000, 0),
        growth: 115,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
    ProducerDef {
        id: "multiverse_nexus",
        name: "Multiverse Nexus",
        description: "Extract eggs from parallel universes",
        base_cost: 5_000_000_000_000_000,
        production: (50_000_000_000_000, 0),
        growth: 112,
        output: Some(PRIMARY_RESOURCE),
        cost_in: PRIMARY_RESOURCE,
    },
];

pub fn producers() -> Vec<Producer> {
    PRODUCERS
        .iter()
        .map(|d| Producer {
            id: d.id.to_string(),
            name: d.name.to_string(),
            description: d.description.to_string(),
            base_cost: NumericValue::from(d.base_cost),
            base_production: NumericValue::from_scaled(d.production.0, d.production.1),
            growth_rate: NumericValue::from_scaled(d.growth, 2),
            owned: 0,
            output: match d.output {
                Some(resource) => ProducerOutput::Resource(resource.to_string()),
                None => ProducerOutput::Boost,
            },
            resource_cost: d.cost_in.to_string(),
            unlocked: false,
            multiplier: NumericValue::ONE,
        })
        .collect()
}

// ── Upgrades ──────────────────────────────────────────────

fn upgrade(id: &str, name: &str, description: &str, cost: u64, effect: Effect) -> Upgrade {
    Upgrade {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        cost: NumericValue::from(cost),
        resource_cost: PRIMARY_RESOURCE.to_string(),
        purchased: false,
        unlocked: false,
        effect,
        requirement: None,
    }
}

/// Producer multiplier upgrade; requires owning at least one of the target.
fn producer_upgrade(id: &str, name: &str, description: &str, cost: u64, target: &str, factor: u64) -> Upgrade {
    let mut u = upgrade(
        id,
        name,
        description,
        cost,
        Effect::MultiplyProducer {
            producer: target.to_string(),
            factor: NumericValue::from(factor),
        },
    );
    u.requirement = Some(Requirement::OwnsProducer {
        producer: target.to_string(),
        count: 1,
    });
    u
}

fn click_upgrade(id: &str, name: &str, description: &str, cost: u64, factor: u64) -> Upgrade {
    upgrade(id, name, description, cost, Effect::MultiplyClickPower(NumericValue::from(factor)))
}

fn global_upgrade(id: &str, name: &str, description: &str, cost: u64) -> Upgrade {
    upgrade(
        id,
        name,
        description,
        cost,
        Effect::MultiplyAllUnlocked(NumericValue::from_scaled(15, 1)),
    )
}

pub fn upgrades() -> Vec<Upgrade> {
    vec![
        // Artisanal
        click_upgrade("better_hands", "Better Hands", "Click 2x as effectively", 50, 2),
        producer_upgrade("selective_breeding", "Selective Breeding", "Chickens produce 2x eggs", 200, CHICKEN, 2),
        upgrade(
            "organic_label",
            "Organic Label",
            "Eggs sell for 2x money",
            500,
            Effect::MultiplySellPrice {
                kind: SellKind::Eggs,
                factor: NumericValue::from(2u64),
            },
        ),
        upgrade(
            "heat_lamps",
            "Heat Lamps",
            "+5% hatch success",
            1_000,
            Effect::AddHatchChance(HATCH_CHANCE_PER_UPGRADE),
        ),
        producer_upgrade("heated_coops", "Heated Coops", "Coops produce 3x eggs", 2_000, "coop", 3),
        global_upgrade("premium_feed", "Premium Feed", "All production +50%", 10_000),
        // Industrial
        producer_upgrade(
            "industrial_automation",
            "Industrial Automation",
            "Incubators produce 2x eggs",
            100_000,
            "incubator",
            2,
        ),
        producer_upgrade("quality_control", "Quality Control", "Factories produce 2x eggs", 1_000_000, "factory", 2),
        click_upgrade("efficient_clicks", "Efficient Clicks", "Click 3x as effectively", 250_000, 3),
        global_upgrade("mass_production", "Mass Production", "All industrial producers +50%", 2_500_000),
        producer_upgrade("robotics", "Robotics", "Conveyor Belts produce 3x eggs", 10_000_000, "conveyor_belt", 3),
        // Biotech
        producer_upgrade(
            "genetic_enhancement",
            "Genetic Enhancement",
            "DNA Sequencers produce 2x eggs",
            1_000_000_000,
            "dna_sequencer",
            2,
        ),
        producer_upgrade("crispr_tech", "CRISPR Technology", "Gene Labs produce 2x eggs", 10_000_000_000, "gene_lab", 2),
        global_upgrade("synthetic_biology", "Synthetic Biology", "All biotech producers +50%", 25_000_000_000),
        producer_upgrade("quantum_dna", "Quantum DNA", "Bioprinters produce 3x eggs", 100_000_000_000, "bioprinter", 3),
        click_upgrade("super_clicks", "Super Clicks", "Click 5x as effectively", 50_000_000_000, 5),
        // Cosmic
        producer_upgrade(
            "zero_g_optimization",
            "Zero-G Optimization",
            "Space Stations produce 2x eggs",
            10_000_000_000_000,
            "space_station",
            2,
        ),
        producer_upgrade(
            "lunar_efficiency",
            "Lunar Efficiency",
            "Moon Colonies produce 2x eggs",
            100_000_000_000_000,
            "moon_colony",
            2,
        ),
        producer_upgrade(
            "stellar_power",
            "Stellar Power",
            "Dyson Spheres produce 3x eggs",
            1_000_000_000_000_000,
            "dyson_sphere",
            3,
        ),
        global_upgrade(
            "interdimensional_boost",
            "Interdimensional Boost",
            "All cosmic producers +50%",
            5_000_000_000_000_000,
        ),
        click_upgrade("cosmic_clicks", "Cosmic Clicks", "Click 10x as effectively", 2_500_000_000_000_000, 10),
    ]
}

// ── Phases ────────────────────────────────────────────────

pub fn phases() -> Vec<Phase> {
    let phase = |id: &str, name: &str, description: &str, threshold: u64, producers: &[&str], upgrades: &[&str]| Phase {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        unlocked: false,
        threshold: NumericValue::from(threshold),
        producers: producers.iter().map(|s| s.to_string()).collect(),
        upgrades: upgrades.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        phase(
            INITIAL_PHASE,
            "Artisanal Age",
            "Humble beginnings with manual egg collection",
            0,
            &[CHICKEN, "coop", "farm", "feed_optimizer"],
            &["better_hands", "selective_breeding", "organic_label", "heat_lamps", "heated_coops", "premium_feed"],
        ),
        phase(
            "industrial",
            "Industrial Revolution",
            "Mass production and automation",
            50_000,
            &["incubator", "factory", "conveyor_belt", "mega_facility"],
            &["industrial_automation", "quality_control", "efficient_clicks", "mass_production", "robotics"],
        ),
        phase(
            "biotech",
            "Biotech Era",
            "Genetic modification and exponential growth",
            10_000_000,
            &["dna_sequencer", "gene_lab", "bioprinter", "evolution_chamber"],
            &["genetic_enhancement", "crispr_tech", "synthetic_biology", "quantum_dna", "super_clicks"],
        ),
        phase(
            "cosmic",
            "Cosmic Age",
            "Galactic colonization and universal domination",
            10_000_000_000,
            &["space_station", "moon_colony", "dyson_sphere", "multiverse_nexus"],
            &["zero_g_optimization", "lunar_efficiency", "stellar_power", "interdimensional_boost", "cosmic_clicks"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_upgrade_belongs_to_one_phase() {
        let phases = phases();
        for u in upgrades() {
            let owners = phases.iter().filter(|p| p.upgrades.contains(&u.id)).count();
            assert_eq!(owners, 1, "{}", u.id);
        }
    }

    #[test]
    fn every_producer_belongs_to_one_phase() {
        let phases = phases();
        for p in producers() {
            let owners = phases.iter().filter(|ph| ph.producers.contains(&p.id)).count();
            assert_eq!(owners, 1, "{}", p.id);
        }
    }

    #[test]
    fn growth_rates_exceed_one() {
        for p in producers() {
            assert!(p.growth_rate > NumericValue::ONE, "{}", p.id);
        }
    }

    #[test]
    fn producer_upgrades_require_their_target() {
        for u in upgrades() {
            if let Effect::MultiplyProducer { producer, .. } = &u.effect {
                assert_eq!(
                    u.requirement,
                    Some(Requirement::OwnsProducer {
                        producer: producer.clone(),
                        count: 1
                    })
                );
            }
        }
    }

    #[test]
    fn only_initial_phase_has_zero_threshold() {
        let zero: Vec<String> = phases()
            .into_iter()
            .filter(|p| p.threshold.is_zero())
            .map(|p| p.id)
            .collect();
        assert_eq!(zero, vec![INITIAL_PHASE.to_string()]);
    }
}
