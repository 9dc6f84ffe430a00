use crate::types::Rank;

/// Errors the engine can report back to a caller. The recursive EV
/// computation itself never fails or panics on well-formed input; every
/// variant here is rejected before any recursion begins.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EngineError {
    #[error("player hand has no cards")]
    EmptyPlayerHand,
    #[error("dealer hand has no cards")]
    EmptyDealerHand,
    #[error("split requested on a non-splittable hand: {0:?}")]
    NotSplittable(Vec<Rank>),
}
