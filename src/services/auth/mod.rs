pub mod chain;
pub mod context;
pub mod propagator;
pub mod redirect;

pub use chain::{ChainFailure, ChainOutcome, FailureKind};
pub use context::{AuthenticationContext, ResourceCtx};
pub use propagator::{AuthenticationPropagator, Chain, ChainFuture, RequestScopePropagator};
