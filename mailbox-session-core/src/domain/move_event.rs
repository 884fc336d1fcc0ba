use crate::domain::ActorId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Absolute-total fields carrying this value mean "no change" and are
/// skipped when resolving a total (movement-only telemetry reuses the
/// coin fields with this marker).
pub const NO_CHANGE_SENTINEL: i64 = -1;

/// Action classifier as it appears on the wire: newer producers send a
/// name, legacy producers send a numeric code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ActionCode {
    Code(u32),
    Name(String),
}

/// Canonical move classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAction {
    CoinCollected,
    Collision,
    Unknown,
}

/// Legacy string codes, normalized (lowercase, separators stripped)
pub const LEGACY_NAME_CODES: &[(&str, MoveAction)] = &[
    ("coin", MoveAction::CoinCollected),
    ("coincollected", MoveAction::CoinCollected),
    ("collect", MoveAction::CoinCollected),
    ("coinpickup", MoveAction::CoinCollected),
    ("pickup", MoveAction::CoinCollected),
    ("hit", MoveAction::Collision),
    ("collision", MoveAction::Collision),
    ("crash", MoveAction::Collision),
    ("obstaclehit", MoveAction::Collision),
];

/// Legacy numeric codes
pub const LEGACY_NUMERIC_CODES: &[(u32, MoveAction)] = &[
    (1, MoveAction::CoinCollected),
    (2, MoveAction::Collision),
];

impl MoveAction {
    /// Map a wire action code onto the canonical enumeration
    ///
    /// String codes are matched case- and separator-insensitively so
    /// "coin_collected", "coinCollected" and "COIN COLLECTED" agree.
    pub fn classify(code: &ActionCode) -> MoveAction {
        match code {
            ActionCode::Code(n) => LEGACY_NUMERIC_CODES
                .iter()
                .find(|(c, _)| c == n)
                .map(|(_, action)| *action)
                .unwrap_or(MoveAction::Unknown),
            ActionCode::Name(name) => {
                let normalized: String = name
                    .chars()
                    .filter(|c| !matches!(c, '_' | '-' | ' '))
                    .flat_map(char::to_lowercase)
                    .collect();

                LEGACY_NAME_CODES
                    .iter()
                    .find(|(c, _)| *c == normalized)
                    .map(|(_, action)| *action)
                    .unwrap_or(MoveAction::Unknown)
            }
        }
    }
}

/// One telemetry record describing a remote participant's action
///
/// Produced by the relay, possibly duplicated or reordered in transit.
/// Never mutated after receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveEvent {
    /// Explicit event identifier, when the producer assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Relay address of the acting participant
    pub actor: ActorId,

    /// Monotonic per-actor sequence number
    #[serde(default)]
    pub sequence: u64,

    /// Action classifier (string or legacy numeric code)
    pub action: ActionCode,

    /// Relay receipt handle, used for derived identities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<String>,

    /// Absolute coin total
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins: Option<i64>,

    /// Absolute remaining-coin count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins_remaining: Option<i64>,

    /// Generic absolute count used by older producers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_count: Option<i64>,

    /// Explicit delta magnitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,

    /// Explicit gain magnitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins_gained: Option<i64>,

    /// Explicit loss magnitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins_lost: Option<i64>,

    /// Course progress fraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// Errors raised when decoding telemetry
#[derive(Debug, thiserror::Error)]
pub enum MoveEventError {
    #[error("Malformed move event: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl MoveEvent {
    pub fn new(actor: ActorId, action: ActionCode) -> Self {
        MoveEvent {
            id: None,
            actor,
            sequence: 0,
            action,
            correlation: None,
            coins: None,
            coins_remaining: None,
            coin_count: None,
            value: None,
            coins_gained: None,
            coins_lost: None,
            progress: None,
        }
    }

    /// Decode a telemetry payload received from the relay
    pub fn from_wire(raw: &str) -> Result<Self, MoveEventError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Identity used for deduplication: the explicit id when present,
    /// otherwise a composite of the correlation handle (falling back to
    /// the actor address) and the sequence number.
    pub fn identity(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }

        let handle = self
            .correlation
            .as_deref()
            .unwrap_or_else(|| self.actor.as_str());
        format!("{}#{}", handle, self.sequence)
    }

    /// Resolve an absolute coin total, checking recognized fields in
    /// order and skipping the no-change sentinel.
    pub fn absolute_total(&self) -> Option<i64> {
        [self.coins, self.coins_remaining, self.coin_count]
            .into_iter()
            .flatten()
            .find(|v| *v != NO_CHANGE_SENTINEL)
    }

    // ===== Builders (used by producers and tests) =====

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_correlation(mut self, correlation: impl Into<String>) -> Self {
        self.correlation = Some(correlation.into());
        self
    }

    pub fn with_coins(mut self, coins: i64) -> Self {
        self.coins = Some(coins);
        self
    }

    pub fn with_coins_remaining(mut self, remaining: i64) -> Self {
        self.coins_remaining = Some(remaining);
        self
    }

    pub fn with_coin_count(mut self, count: i64) -> Self {
        self.coin_count = Some(count);
        self
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_coins_gained(mut self, gained: i64) -> Self {
        self.coins_gained = Some(gained);
        self
    }

    pub fn with_coins_lost(mut self, lost: i64) -> Self {
        self.coins_lost = Some(lost);
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }
}
