/// Errors raised while assembling filters.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("a labeling strategy is already installed on this builder")]
    StrategyAlreadySet,

    #[error("no labeling strategy installed")]
    NoStrategy,

    #[error("invalid range bounds: {reason}")]
    InvalidBounds { reason: String },
}
