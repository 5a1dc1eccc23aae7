//! Save, load, export, and import through the public API.

use std::io::Write;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use egg_empire::economy::defs::{CHICKEN, PRIMARY_RESOURCE};
use egg_empire::economy::save::{self, SaveData};
use egg_empire::numeric::MAX_EXPONENT;
use egg_empire::{EggEmpire, EngineConfig, MemoryStorage, NumericValue, SaveManager, SaveStorage};

fn n(s: &str) -> NumericValue {
    s.parse().unwrap()
}

fn manager() -> SaveManager<MemoryStorage> {
    SaveManager::new(MemoryStorage::new(), EngineConfig::default())
}

/// Export string for a fresh game whose egg amount is the raw `eggs` text.
fn export_with_eggs(eggs: &str) -> String {
    let data = SaveData {
        version: "1.0.0".into(),
        timestamp: 1,
        state: save::extract_save(EggEmpire::new(9).state()),
    };
    let mut json = serde_json::to_value(&data).unwrap();
    json["state"]["resources"]["eggs"]["amount"] = eggs.into();
    json["state"]["resources"]["eggs"]["totalEarned"] = eggs.into();
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.to_string().as_bytes()).unwrap();
    URL_SAFE_NO_PAD.encode(encoder.finish().unwrap())
}

fn big_game() -> EggEmpire {
    let mut game = EggEmpire::new(9);
    let eggs = game
        .state_mut()
        .resources
        .get_mut(PRIMARY_RESOURCE)
        .unwrap();
    eggs.amount = n("123456789012345678");
    eggs.total_earned = n("123456789012345678");
    game.state_mut().producers.get_mut(CHICKEN).unwrap().owned = 7;
    game
}

#[test]
fn large_amount_survives_save_and_load() {
    let mut mgr = manager();
    let mut game = big_game();
    assert!(mgr.save(game.state_mut(), 1_000));

    let mut restored = EggEmpire::new(9);
    assert!(mgr.load(restored.state_mut()));
    assert_eq!(
        restored.state().amount(PRIMARY_RESOURCE).to_string(),
        "123456789012345678"
    );
    assert_eq!(restored.state().producer(CHICKEN).unwrap().owned, 7);
}

#[test]
fn large_amount_survives_export_and_import() {
    let mgr = manager();
    let game = big_game();
    let exported = mgr.export(game.state(), 5).unwrap();

    let mut restored = EggEmpire::new(9);
    assert!(mgr.import(restored.state_mut(), &exported));
    assert_eq!(
        restored.state().amount(PRIMARY_RESOURCE),
        n("123456789012345678")
    );
}

#[test]
fn corrupt_import_changes_nothing() {
    let mgr = manager();
    let mut game = big_game();
    let before = save::extract_save(game.state());
    assert!(!mgr.import(game.state_mut(), "!!not-base64!!"));
    assert!(!mgr.import(game.state_mut(), "AAAA"));
    assert_eq!(save::extract_save(game.state()), before);
}

#[test]
fn reload_does_not_pay_rewards_twice() {
    let mut mgr = manager();
    let mut game = EggEmpire::new(9);
    for _ in 0..10 {
        game.click();
    }
    game.tick(0.016);
    assert_eq!(game.state().click_power, n("2"));
    assert!(mgr.save(game.state_mut(), 1));

    let mut restored = EggEmpire::new(9);
    assert!(mgr.load(restored.state_mut()));
    assert_eq!(restored.state().click_power, n("2"));
    assert!(restored.state().achievements.is_unlocked("first_tap"));
    assert!(restored.tick(0.016).is_empty());
    assert_eq!(restored.state().click_power, n("2"));
}

#[test]
fn unaccounted_reward_is_paid_on_load() {
    let mut mgr = manager();
    let mut game = EggEmpire::new(9);
    for _ in 0..10 {
        game.click();
    }
    game.tick(0.016);

    // A save that lists the achievement but not its reward, with the
    // click power from before the reward
    let mut data = SaveData {
        version: "1.0.0".into(),
        timestamp: 1,
        state: save::extract_save(game.state()),
    };
    data.state.click_power = NumericValue::ONE;
    data.state.achievement_rewards = Some(Vec::new());
    let encoded = save::encode(&data).unwrap();
    mgr.storage_mut().set("egg-empire-save", &encoded).unwrap();

    let mut restored = EggEmpire::new(9);
    assert!(mgr.load(restored.state_mut()));
    assert_eq!(restored.state().click_power, n("2"));
    assert!(restored.state().achievements.is_reward_applied("first_tap"));
}

#[test]
fn load_sets_last_save_time_for_offline_progress() {
    let mut mgr = manager();
    let mut game = EggEmpire::new(9);
    game.state_mut().producers.get_mut(CHICKEN).unwrap().owned = 5;
    assert!(mgr.save(game.state_mut(), 50_000));

    let mut restored = EggEmpire::new(9);
    assert!(mgr.load(restored.state_mut()));
    assert_eq!(restored.state().last_save_time, 50_000);
    let gain = restored.apply_offline_progress(150_000);
    assert!(gain.approx_eq(n("50"), 1e-20), "{gain}");
}

#[test]
fn absurd_exponent_is_refused_on_import() {
    let mgr = manager();
    let mut game = EggEmpire::new(9);
    assert!(!mgr.import(game.state_mut(), &export_with_eggs("1e9223372036854775807")));
    assert_eq!(game.state().amount(PRIMARY_RESOURCE), NumericValue::ZERO);
    game.tick(0.016);
}

#[test]
fn amount_at_exponent_bound_keeps_ticking() {
    let mgr = manager();
    let mut game = EggEmpire::new(9);
    let top = format!("9e{MAX_EXPONENT}");
    assert!(mgr.import(game.state_mut(), &export_with_eggs(&top)));

    game.click();
    game.tick(0.016);
    assert!(game.buy(CHICKEN, 1));
    game.tick(1.0);
    let eggs = game.state().amount(PRIMARY_RESOURCE);
    assert_eq!(eggs.exponent(), MAX_EXPONENT);

    let again = mgr.export(game.state(), 2).unwrap();
    let mut restored = EggEmpire::new(9);
    assert!(mgr.import(restored.state_mut(), &again));
    assert_eq!(restored.state().amount(PRIMARY_RESOURCE), eggs);
}
