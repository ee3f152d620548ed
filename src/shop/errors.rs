use thiserror::Error;

/// Contract violations raised by the shop engine.
///
/// These indicate a caller bug (bad index, mismatched fusion, acting on a
/// finished turn). State is never modified when one of these is returned.
/// Expected, user-facing refusals are reported as
/// [`DeclineReason`](crate::shop::DeclineReason) instead.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Fusion attempted between instances of different templates.
    #[error("cannot fuse {incoming} into {target}: template mismatch")]
    TemplateMismatch { target: String, incoming: String },

    /// A slate slot index outside the current slate.
    #[error("shop slot {slot} out of range (slate has {len} entries)")]
    SlotOutOfRange { slot: usize, len: usize },

    /// A roster index outside the roster (or past its capacity).
    #[error("roster index {index} out of range (limit {len})")]
    RosterIndexOutOfRange { index: usize, len: usize },

    /// Player seat not present in the match.
    #[error("no player in seat {0}")]
    UnknownSeat(usize),

    /// An action was submitted after `EndTurn`.
    #[error("shop session already closed for this turn")]
    SessionClosed,

    /// Turn number below 1 or no configuration available.
    #[error("no shop configuration for turn {0}")]
    UnknownTurn(u32),

    /// Catalog ingestion failure.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Errors that can arise while ingesting catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Wrapper around IO errors (reading the catalog file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON did not match the catalog schema (missing or mistyped field).
    #[error("failed to parse {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Template id inside the entry disagrees with its key.
    #[error("template key {key} does not match embedded id {id}")]
    IdMismatch { key: String, id: String },

    /// Numeric tier outside 1..=255.
    #[error("template {id} has invalid tier {tier}")]
    InvalidTier { id: String, tier: i64 },

    /// Turn key that is neither `turn-N` nor `N`.
    #[error("invalid turn key: {0}")]
    InvalidTurnKey(String),

    /// Two turn keys naming the same turn (e.g. `turn-1` and `1`).
    #[error("turn {turn} defined more than once (key {key})")]
    DuplicateTurn { turn: u32, key: String },

    /// More than three ability slots.
    #[error("template {id} defines {count} abilities (max 3)")]
    TooManyAbilities { id: String, count: usize },

    /// Negative, NaN or infinite appearance weight.
    #[error("template {id} has invalid weight {weight} for pack {pack}")]
    InvalidProbability { id: String, pack: String, weight: f64 },

    /// Turn configuration with a zero level-up tier.
    #[error("turn {0} has levelUpTier 0")]
    InvalidTurnConfig(u32),

    /// The turn table lacks turn 1.
    #[error("turn table must define turn 1")]
    MissingFirstTurn,
}
