//! Reasons the reducer declines an action.

/// Why an action was rejected.
///
/// Rejections are soft: the reducer still returns the untouched state and an
/// empty event list. The reason is informational for hosts and logs.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("run is not active")]
    RunNotActive,

    #[error("no tool uses remaining")]
    NoToolsRemaining,

    #[error("unknown tool {0}")]
    UnknownTool(String),

    #[error("unknown upgrade {0}")]
    UnknownUpgrade(String),

    #[error("upgrade {0} is already owned")]
    UpgradeAlreadyOwned(String),

    #[error("insufficient credits: need {cost}, have {credits}")]
    InsufficientCredits { cost: u64, credits: u64 },

    #[error("unknown block {0}")]
    UnknownBlock(String),

    #[error("block {block_id} does not fit at ({row}, {column})")]
    BlockDoesNotFit {
        block_id: String,
        row: i32,
        column: i32,
    },
}

impl Rejection {
    /// Stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::RunNotActive => "run_not_active",
            Rejection::NoToolsRemaining => "no_tools_remaining",
            Rejection::UnknownTool(_) => "unknown_tool",
            Rejection::UnknownUpgrade(_) => "unknown_upgrade",
            Rejection::UpgradeAlreadyOwned(_) => "upgrade_already_owned",
            Rejection::InsufficientCredits { .. } => "insufficient_credits",
            Rejection::UnknownBlock(_) => "unknown_block",
            Rejection::BlockDoesNotFit { .. } => "block_does_not_fit",
        }
    }
}
