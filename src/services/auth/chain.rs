//! Tagged result of running the downstream handler chain.
//!
//! Handlers fail by returning `AppError`, whose response carries a
//! `ChainFailure` extension. The filter turns the response back into a
//! `ChainOutcome` so the log-then-propagate rule is a plain `match`.
use std::fmt;

use axum::response::Response;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// I/O or protocol level failure. Logged by the filter, then propagated.
    Recoverable,
    /// Anything else. Propagated untouched.
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ChainFailure {
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Recoverable,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Fatal,
            message: message.into(),
        }
    }
}

impl fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub enum ChainOutcome {
    Completed(Response),
    Failed(ChainFailure, Response),
}

impl ChainOutcome {
    pub fn from_response(response: Response) -> Self {
        match response.extensions().get::<ChainFailure>().cloned() {
            Some(failure) => Self::Failed(failure, response),
            None => Self::Completed(response),
        }
    }

    pub fn failure(&self) -> Option<&ChainFailure> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(failure, _) => Some(failure),
        }
    }

    /// The response exactly as the chain produced it.
    pub fn into_response(self) -> Response {
        match self {
            Self::Completed(response) | Self::Failed(_, response) => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn untagged_responses_are_completed() {
        let outcome = ChainOutcome::from_response((StatusCode::NOT_FOUND, "nope").into_response());

        assert!(outcome.failure().is_none());
        assert_eq!(outcome.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn tagged_responses_keep_their_failure_and_response() {
        let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
        response
            .extensions_mut()
            .insert(ChainFailure::recoverable("connection reset"));

        let outcome = ChainOutcome::from_response(response);
        assert_eq!(
            outcome.failure(),
            Some(&ChainFailure::recoverable("connection reset"))
        );
        assert_eq!(
            outcome.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
