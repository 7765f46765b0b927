use std::{future::Future, pin::Pin};

use axum::extract::Request;
use tracing::Instrument;

use crate::services::auth::{chain::ChainOutcome, context::ResourceCtx};

pub type ChainFuture = Pin<Box<dyn Future<Output = ChainOutcome> + Send>>;

/// Rest of the request pipeline, invoked at most once.
pub type Chain = Box<dyn FnOnce(Request) -> ChainFuture + Send>;

pub type RunAsFuture<'a> = Pin<Box<dyn Future<Output = ChainOutcome> + Send + 'a>>;

/// Runs a downstream chain as a given resource.
///
/// Implementations must not let the binding outlive `chain`: once the
/// returned future completes (or is dropped) the identity is gone.
pub trait AuthenticationPropagator: Send + Sync {
    fn run_as<'a>(&'a self, resource_id: i64, req: Request, chain: Chain) -> RunAsFuture<'a>;
}

/// Binds the identity to the request itself.
///
/// The `ResourceCtx` travels in the request extensions, which only this
/// request's chain can see, and a `run_as` span is entered for every poll
/// of the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestScopePropagator;

impl AuthenticationPropagator for RequestScopePropagator {
    fn run_as<'a>(
        &'a self,
        resource_id: i64,
        mut req: Request,
        chain: Chain,
    ) -> RunAsFuture<'a> {
        let span = tracing::info_span!("run_as", resource_id);

        if let Some(prior) = req
            .extensions_mut()
            .insert(ResourceCtx::authenticated(resource_id))
        {
            tracing::debug!(
                prior_resource_id = prior.current_resource_id(),
                resource_id,
                "rebinding resource identity"
            );
        }

        Box::pin(chain(req).instrument(span))
    }
}
