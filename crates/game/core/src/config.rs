use serde::{Deserialize, Serialize};

/// Scoring rules for a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Score at or above which a completed run counts as a success.
    pub target_score: f64,
    /// Tick count at or above which an unfinished run counts as a failure.
    pub max_ticks: u32,
    /// Score awarded per `use_tool`. Accuracy upgrades raise it to two decimals.
    pub score_per_tool: f64,
}

impl GameConfig {
    pub const DEFAULT_TARGET_SCORE: f64 = 4.0;
    pub const DEFAULT_MAX_TICKS: u32 = 3;
    pub const DEFAULT_SCORE_PER_TOOL: f64 = 1.0;

    /// Latency upgrades never push `max_ticks` below this.
    pub const MIN_MAX_TICKS: u32 = 2;
    /// Accuracy upgrades never push `score_per_tool` below this.
    pub const MIN_SCORE_PER_TOOL: f64 = 1.0;

    pub fn new() -> Self {
        Self {
            target_score: Self::DEFAULT_TARGET_SCORE,
            max_ticks: Self::DEFAULT_MAX_TICKS,
            score_per_tool: Self::DEFAULT_SCORE_PER_TOOL,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumable resources spent across runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyState {
    pub credits: u64,
    pub token_budget: u64,
    /// Tool uses granted at the start of every run.
    pub tool_budget: u64,
    /// Credits charged per `use_tool`.
    pub tool_cost: u64,
}

impl EconomyState {
    pub const DEFAULT_CREDITS: u64 = 1240;
    pub const DEFAULT_TOKEN_BUDGET: u64 = 82_340;
    pub const DEFAULT_TOOL_BUDGET: u64 = 6;
    pub const DEFAULT_TOOL_COST: u64 = 80;

    // ===== run payouts =====
    pub const SUCCESS_REWARD: i64 = 120;
    pub const PARTIAL_REWARD: i64 = 40;
    pub const FAIL_PENALTY: i64 = -60;

    pub fn new() -> Self {
        Self {
            credits: Self::DEFAULT_CREDITS,
            token_budget: Self::DEFAULT_TOKEN_BUDGET,
            tool_budget: Self::DEFAULT_TOOL_BUDGET,
            tool_cost: Self::DEFAULT_TOOL_COST,
        }
    }

    /// Applies a signed credit delta, flooring at zero.
    pub fn adjust_credits(&mut self, delta: i64) {
        self.credits = if delta >= 0 {
            self.credits.saturating_add(delta.unsigned_abs())
        } else {
            self.credits.saturating_sub(delta.unsigned_abs())
        };
    }
}

impl Default for EconomyState {
    fn default() -> Self {
        Self::new()
    }
}
