//! Error types for the economy engine.
//!
//! Nothing in the engine is fatal: callers at the public boundary map these
//! to `false`/`None` and log them.

use thiserror::Error;

use crate::numeric::NumericValue;

/// Why an action (purchase, sale, hatch, prestige) was rejected.
///
/// A rejected action never leaves partial mutations behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    /// No resource with this id is registered.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// No producer with this id is registered.
    #[error("unknown producer: {0}")]
    UnknownProducer(String),

    /// No upgrade with this id is registered.
    #[error("unknown upgrade: {0}")]
    UnknownUpgrade(String),

    /// The producer's phase has not been reached yet.
    #[error("producer is locked: {0}")]
    ProducerLocked(String),

    /// The upgrade's phase has not been reached yet.
    #[error("upgrade is locked: {0}")]
    UpgradeLocked(String),

    /// Upgrades can only be bought once.
    #[error("upgrade already purchased: {0}")]
    AlreadyPurchased(String),

    /// The upgrade's extra requirement does not hold.
    #[error("requirement not met for upgrade: {0}")]
    RequirementUnmet(String),

    /// The paying resource (or producer count) is too small.
    #[error("insufficient {resource}: need {required}, have {available}")]
    Insufficient {
        /// Resource or producer id that was short.
        resource: String,
        /// Quantity the action needed.
        required: NumericValue,
        /// Quantity that was available.
        available: NumericValue,
    },

    /// Zero-sized purchase or sale.
    #[error("amount must be at least 1")]
    ZeroAmount,

    /// Lifetime earnings are below the prestige floor.
    #[error("not enough lifetime earnings to prestige")]
    NothingToPrestige,
}

/// Failures of the save/load/export/import pipeline.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The storage collaborator rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// No save exists under the configured key.
    #[error("no save data found")]
    Missing,

    /// The string is not valid base64 in the expected alphabet.
    #[error("save is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// DEFLATE compression or decompression failed.
    #[error("save compression failed: {0}")]
    Compression(#[from] std::io::Error),

    /// The payload inflates past the size limit.
    #[error("save expands past {limit} bytes")]
    TooLarge {
        /// Largest accepted decompressed size.
        limit: u64,
    },

    /// The decompressed payload is not a valid save record.
    #[error("save record is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// A string that is not a decimal number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid numeric value: {input:?}")]
pub struct NumericParseError {
    input: String,
}

impl NumericParseError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// Failures loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config document is not valid JSON for the expected shape.
    #[error("failed to parse engine config: {0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed but is outside its allowed range.
    #[error("invalid engine config: {0}")]
    Invalid(String),
}
