/// Errors from parsing view-level identifiers (chart kinds, keys).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("unknown chart kind: {0}")]
    UnknownChart(String),

    #[error("unknown timeline key: {0}")]
    UnknownKey(String),
}
