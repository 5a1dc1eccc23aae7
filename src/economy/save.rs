//! Egg Empire セーブ/ロード機能。
//!
//! ## フォーマット
//!
//! `SaveData` を JSON にシリアライズし、raw DEFLATE で圧縮してから base64 で
//! エンコードする。セーブスロットは標準アルファベット、エクスポート文字列は
//! URL セーフ（パディングなし）アルファベットを使う。
//!
//! 数値はすべて `NumericValue` の正規文字列で保存するので、10^15 を超える値も
//! 桁落ちせずに往復する。
//!
//! ## バージョニング方針
//!
//! - `version` は `EngineConfig::game_version` をそのまま書き込む。
//! - 読み込み時にバージョンが一致しない場合は警告を出して、そのまま読み込む
//!   （マイグレーションは行わない）。
//! - 旧セーブに存在しないフィールドは `#[serde(default)]` で補完する。
//!
//! ## 復元ルール
//!
//! 文字列を最後までパースしてから状態に触れる。パースに失敗した場合は状態を
//! 一切変更しない。ID はセーブとレジストリの両方に存在するものだけ上書きする。

use std::collections::BTreeMap;
use std::io::{Read, Write};

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::achievements;
use super::logic;
use super::state::GameState;
use crate::config::EngineConfig;
use crate::error::SaveError;
use crate::numeric::NumericValue;
use crate::storage::SaveStorage;

/// 展開後の JSON の最大サイズ（バイト）。
pub const MAX_SAVE_BYTES: u64 = 4 * 1024 * 1024;

/// セーブファイル全体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub version: String,
    /// 保存時刻（Unix エポックからのミリ秒）。
    pub timestamp: u64,
    pub state: GameSave,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceSave {
    pub amount: NumericValue,
    pub total_earned: NumericValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProducerSave {
    pub owned: u64,
    pub multiplier: NumericValue,
}

impl Default for ProducerSave {
    fn default() -> Self {
        Self {
            owned: 0,
            multiplier: NumericValue::ONE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatisticsSave {
    pub total_eggs_produced: NumericValue,
    pub total_clicks: u64,
    pub total_money_earned: NumericValue,
    pub prestige_count: u64,
    pub fastest_phase_unlock: f64,
}

/// シリアライズ用のゲーム状態。
/// タイマーなど一時的な状態（`auto_hatch_timer`, `last_tick_time`）は含まない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSave {
    pub resources: BTreeMap<String, ResourceSave>,
    pub producers: BTreeMap<String, ProducerSave>,
    /// アップグレード ID → 購入済みか。
    pub upgrades: BTreeMap<String, bool>,
    /// フェーズ ID → 解放済みか。
    pub phases: BTreeMap<String, bool>,
    /// 解放済み実績 ID。
    pub achievements: Vec<String>,
    /// 報酬が状態に反映済みの実績 ID。旧セーブには存在しない。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement_rewards: Option<Vec<String>>,
    pub current_phase: String,
    pub total_clicks: u64,
    pub click_power: NumericValue,
    pub total_play_time: f64,
    pub auto_hatch_count: u64,
    pub statistics: StatisticsSave,
}

impl Default for GameSave {
    fn default() -> Self {
        Self {
            resources: BTreeMap::new(),
            producers: BTreeMap::new(),
            upgrades: BTreeMap::new(),
            phases: BTreeMap::new(),
            achievements: Vec::new(),
            achievement_rewards: None,
            current_phase: String::new(),
            total_clicks: 0,
            click_power: NumericValue::ONE,
            total_play_time: 0.0,
            auto_hatch_count: 0,
            statistics: StatisticsSave::default(),
        }
    }
}

/// GameState からセーブ用データを抽出する。
pub fn extract_save(state: &GameState) -> GameSave {
    GameSave {
        resources: state
            .resources
            .iter()
            .map(|(id, r)| {
                (
                    id.clone(),
                    ResourceSave {
                        amount: r.amount,
                        total_earned: r.total_earned,
                    },
                )
            })
            .collect(),
        producers: state
            .producers
            .iter()
            .map(|(id, p)| {
                (
                    id.clone(),
                    ProducerSave {
                        owned: p.owned,
                        multiplier: p.multiplier,
                    },
                )
            })
            .collect(),
        upgrades: state
            .upgrades
            .iter()
            .map(|(id, u)| (id.clone(), u.purchased))
            .collect(),
        phases: state
            .phases
            .iter()
            .map(|(id, p)| (id.clone(), p.unlocked))
            .collect(),
        achievements: state.achievements.unlocked_ids(),
        achievement_rewards: Some(state.achievements.rewarded_ids()),
        current_phase: state.current_phase.clone(),
        total_clicks: state.total_clicks,
        click_power: state.click_power,
        total_play_time: state.total_play_time,
        auto_hatch_count: state.auto_hatch_count,
        statistics: StatisticsSave {
            total_eggs_produced: state.statistics.total_eggs_produced,
            total_clicks: state.statistics.total_clicks,
            total_money_earned: state.statistics.total_money_earned,
            prestige_count: state.statistics.prestige_count,
            fastest_phase_unlock: state.statistics.fastest_phase_unlock,
        },
    }
}

/// セーブデータを GameState に復元する。
/// レジストリに存在しない ID は無視し、セーブにない ID は現在の値を維持する。
pub fn apply_save(state: &mut GameState, save: &GameSave) {
    for (id, saved) in &save.resources {
        if let Some(r) = state.resources.get_mut(id) {
            r.amount = saved.amount;
            r.total_earned = saved.total_earned;
        }
    }

    for (id, saved) in &save.producers {
        if let Some(p) = state.producers.get_mut(id) {
            p.owned = saved.owned;
            p.set_multiplier(saved.multiplier);
        }
    }

    // 効果はセーブ済みの倍率・クリック力に反映済みなので再適用しない
    for (id, &purchased) in &save.upgrades {
        if let Some(u) = state.upgrades.get_mut(id) {
            u.purchased = purchased;
        }
    }

    for (id, &unlocked) in &save.phases {
        if let Some(p) = state.phases.get_mut(id) {
            p.unlocked = unlocked;
        }
    }
    // 解放済みフェーズのカスケードを無条件に再実行する
    logic::recascade_unlocked(state);

    if state.phases.contains_key(&save.current_phase) {
        state.current_phase = save.current_phase.clone();
    }
    state.total_clicks = save.total_clicks;
    state.click_power = save.click_power;
    state.total_play_time = save.total_play_time;
    state.auto_hatch_count = save.auto_hatch_count;

    state.statistics.total_eggs_produced = save.statistics.total_eggs_produced;
    state.statistics.total_clicks = save.statistics.total_clicks;
    state.statistics.total_money_earned = save.statistics.total_money_earned;
    state.statistics.prestige_count = save.statistics.prestige_count;
    state.statistics.fastest_phase_unlock = save.statistics.fastest_phase_unlock;

    // クリック力と倍率を復元してから実績報酬を判定する
    achievements::restore(
        state,
        &save.achievements,
        save.achievement_rewards.as_deref(),
    );
}

fn encode_with<E: Engine>(data: &SaveData, engine: &E) -> Result<String, SaveError> {
    let json = serde_json::to_vec(data)?;
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(engine.encode(compressed))
}

fn decode_with<E: Engine>(encoded: &str, engine: &E) -> Result<SaveData, SaveError> {
    let compressed = engine.decode(encoded.trim())?;
    // 上限 +1 バイトまで読めば超過を判定できる
    let mut json = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .take(MAX_SAVE_BYTES + 1)
        .read_to_end(&mut json)?;
    if json.len() as u64 > MAX_SAVE_BYTES {
        return Err(SaveError::TooLarge {
            limit: MAX_SAVE_BYTES,
        });
    }
    Ok(serde_json::from_slice(&json)?)
}

/// セーブスロット用にエンコードする（標準 base64）。
pub fn encode(data: &SaveData) -> Result<String, SaveError> {
    encode_with(data, &STANDARD)
}

/// セーブスロットの文字列をデコードする。状態には触れない。
pub fn decode(encoded: &str) -> Result<SaveData, SaveError> {
    decode_with(encoded, &STANDARD)
}

/// エクスポート用にエンコードする（URL セーフ、パディングなし）。
pub fn encode_export(data: &SaveData) -> Result<String, SaveError> {
    encode_with(data, &URL_SAFE_NO_PAD)
}

/// エクスポート文字列をデコードする。状態には触れない。
pub fn decode_export(encoded: &str) -> Result<SaveData, SaveError> {
    decode_with(encoded, &URL_SAFE_NO_PAD)
}

/// 単一スロットのセーブ管理。失敗はここでログに出し、`bool` / `Option` で返す。
pub struct SaveManager<S: SaveStorage> {
    storage: S,
    config: EngineConfig,
}

impl<S: SaveStorage> SaveManager<S> {
    pub fn new(storage: S, config: EngineConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn snapshot(&self, state: &GameState, now_ms: u64) -> SaveData {
        SaveData {
            version: self.config.game_version.clone(),
            timestamp: now_ms,
            state: extract_save(state),
        }
    }

    /// スロットに保存し、成功したら `last_save_time` を `now_ms` にする。
    pub fn save(&mut self, state: &mut GameState, now_ms: u64) -> bool {
        let encoded = match encode(&self.snapshot(state, now_ms)) {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "failed to encode save");
                return false;
            }
        };
        if let Err(e) = self.storage.set(&self.config.save_key, &encoded) {
            error!(error = %e, key = %self.config.save_key, "failed to write save");
            return false;
        }
        state.last_save_time = now_ms;
        info!(timestamp = now_ms, bytes = encoded.len(), "game saved");
        true
    }

    fn read_slot(&self) -> Result<SaveData, SaveError> {
        let encoded = self
            .storage
            .get(&self.config.save_key)?
            .ok_or(SaveError::Missing)?;
        decode(&encoded)
    }

    /// スロットから復元する。壊れたセーブは状態を変更せずに `false` を返す。
    pub fn load(&self, state: &mut GameState) -> bool {
        let data = match self.read_slot() {
            Ok(d) => d,
            Err(SaveError::Missing) => return false,
            Err(e) => {
                warn!(error = %e, "rejected save data");
                return false;
            }
        };
        self.warn_on_version_mismatch(&data);
        apply_save(state, &data.state);
        state.last_save_time = data.timestamp;
        info!(
            version = %data.version,
            timestamp = data.timestamp,
            "game loaded"
        );
        true
    }

    fn warn_on_version_mismatch(&self, data: &SaveData) {
        if data.version != self.config.game_version {
            warn!(
                saved = %data.version,
                current = %self.config.game_version,
                "save version mismatch, loading best effort"
            );
        }
    }

    /// コピー＆ペースト用のエクスポート文字列。
    pub fn export(&self, state: &GameState, now_ms: u64) -> Option<String> {
        match encode_export(&self.snapshot(state, now_ms)) {
            Ok(s) => Some(s),
            Err(e) => {
                error!(error = %e, "failed to export save");
                None
            }
        }
    }

    /// エクスポート文字列から復元する。不正な文字列では状態を変更しない。
    pub fn import(&self, state: &mut GameState, encoded: &str) -> bool {
        let data = match decode_export(encoded) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "rejected imported save");
                return false;
            }
        };
        self.warn_on_version_mismatch(&data);
        apply_save(state, &data.state);
        info!(version = %data.version, "save imported");
        true
    }

    pub fn has_save(&self) -> bool {
        matches!(self.storage.get(&self.config.save_key), Ok(Some(_)))
    }

    pub fn delete_save(&mut self) -> bool {
        match self.storage.remove(&self.config.save_key) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to delete save");
                false
            }
        }
    }
}
