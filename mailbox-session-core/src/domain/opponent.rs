use crate::domain::{ActorId, MoveAction, MoveEvent, NO_CHANGE_SENTINEL};
use serde::Serialize;
use std::collections::HashSet;

/// Coins an opponent starts a run with
pub const DEFAULT_STARTING_COINS: u32 = 3;

/// Coin value of a single collect/collision event when the event
/// carries no explicit delta
pub const DEFAULT_COIN_VALUE: u32 = 1;

/// Tunables for opponent reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentConfig {
    pub starting_coins: u32,
    pub coin_value: u32,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        OpponentConfig {
            starting_coins: DEFAULT_STARTING_COINS,
            coin_value: DEFAULT_COIN_VALUE,
        }
    }
}

impl OpponentConfig {
    pub fn with_starting_coins(mut self, coins: u32) -> Self {
        self.starting_coins = coins;
        self
    }

    pub fn with_coin_value(mut self, value: u32) -> Self {
        self.coin_value = value;
        self
    }
}

/// What a single applied move did to the opponent's state
///
/// Callers drive UI and audit updates from this instead of re-deriving
/// state themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOutcome {
    /// Coin count after the move
    pub coins: u32,

    /// Progress after the move, if ever observed
    pub progress: Option<f64>,

    /// Whether this move transitioned the opponent into the ended state
    pub ended_now: bool,

    /// Whether coins or progress actually changed
    pub changed: bool,

    /// Identity the move was deduplicated by
    pub move_id: String,
}

/// Folds one remote actor's telemetry stream into a consistent snapshot
///
/// Events may arrive duplicated, reordered, or partial; applying the
/// same event any number of times is safe. Within a stream of absolute
/// totals, last write wins: no sequence tiebreak is enforced for
/// absolute fields, only identity-based dedup.
#[derive(Debug, Clone)]
pub struct OpponentReconciler {
    /// Relay address this reconciler is bound to
    actor: ActorId,

    /// Current coin count, never negative
    coins: u32,

    /// Course progress, None until first observed
    progress: Option<f64>,

    /// Sticky end-of-run flag
    ended: bool,

    /// Identities of every applied move; grows monotonically
    applied: HashSet<String>,

    /// Whether any applied move has changed the coin count yet
    coin_activity_seen: bool,

    config: OpponentConfig,
}

impl OpponentReconciler {
    /// Track an opponent with default configuration
    pub fn new(actor: ActorId) -> Self {
        Self::with_config(actor, OpponentConfig::default())
    }

    pub fn with_config(actor: ActorId, config: OpponentConfig) -> Self {
        OpponentReconciler {
            actor,
            coins: config.starting_coins,
            progress: None,
            ended: false,
            applied: HashSet::new(),
            coin_activity_seen: false,
            config,
        }
    }

    // ===== Getters =====

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn progress(&self) -> Option<f64> {
        self.progress
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Apply one telemetry event.
    ///
    /// Returns `None` for duplicates (pure no-op). Once the opponent has
    /// ended, events are ignored and a no-change outcome is returned.
    pub fn apply_move(&mut self, event: &MoveEvent) -> Option<MoveOutcome> {
        if event.actor != self.actor {
            tracing::warn!(
                "dropping move for {} on reconciler bound to {}",
                event.actor,
                self.actor
            );
            return None;
        }

        let move_id = event.identity();

        if self.ended {
            return Some(MoveOutcome {
                coins: self.coins,
                progress: self.progress,
                ended_now: false,
                changed: false,
                move_id,
            });
        }

        if self.applied.contains(&move_id) {
            tracing::debug!("duplicate move {}, skipping", move_id);
            return None;
        }
        self.applied.insert(move_id.clone());

        let coins_before = self.coins;
        let progress_before = self.progress;

        if let Some(total) = event.absolute_total() {
            // Absolute totals replace the count directly; last write wins
            self.coins = total.max(0) as u32;
        } else {
            let delta = self.signed_delta(event);
            self.coins = (self.coins as i64 + delta).max(0) as u32;
        }

        let coins_changed = self.coins != coins_before;
        if coins_changed {
            self.coin_activity_seen = true;
        }

        if let Some(progress) = event.progress {
            self.progress = Some(progress.clamp(0.0, 1.0));
        }
        let progress_changed = self.progress != progress_before;

        let mut ended_now = false;
        if self.coins == 0 && self.coin_activity_seen {
            self.ended = true;
            ended_now = true;
            tracing::info!("opponent {} ran out of coins", self.actor);
        }

        Some(MoveOutcome {
            coins: self.coins,
            progress: self.progress,
            ended_now,
            changed: coins_changed || progress_changed,
            move_id,
        })
    }

    /// Signed coin change for an event without an absolute total.
    ///
    /// Explicit delta fields override the configured default magnitude;
    /// the action classification supplies the sign.
    fn signed_delta(&self, event: &MoveEvent) -> i64 {
        match MoveAction::classify(&event.action) {
            MoveAction::CoinCollected => self.explicit_magnitude(event),
            MoveAction::Collision => -self.explicit_magnitude(event),
            MoveAction::Unknown => {
                delta_field(event.coins_gained) - delta_field(event.coins_lost)
            }
        }
    }

    fn explicit_magnitude(&self, event: &MoveEvent) -> i64 {
        let mut total = 0i64;
        let mut any = false;

        for field in [event.value, event.coins_gained, event.coins_lost] {
            if let Some(v) = field {
                if v == NO_CHANGE_SENTINEL {
                    continue;
                }
                total += v.abs();
                any = true;
            }
        }

        if any {
            total
        } else {
            self.config.coin_value as i64
        }
    }
}

fn delta_field(field: Option<i64>) -> i64 {
    match field {
        Some(NO_CHANGE_SENTINEL) | None => 0,
        Some(v) => v.abs(),
    }
}
