//! Harness error taxonomy.

use memberdesk_application::ApplicationError;
use memberdesk_application::ports::HttpClientError;
use memberdesk_domain::DomainError;
use memberdesk_domain::testing::{AssertionError, TableError, UnknownOperation};
use thiserror::Error;

use crate::context::ContextError;

/// Why a step or the run failed.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Provisioning or schema initialization failed; the run cannot continue.
    #[error("setup failed: {0}")]
    Setup(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] HttpClientError),

    /// An expectation did not hold.
    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionError),

    /// A scenario value was missing or had the wrong type.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Step arguments or tables could not be interpreted.
    #[error("invalid step input: {0}")]
    InvalidStep(String),

    /// The response body was not blank and not JSON.
    #[error("response body is not JSON ({reason}): {body}")]
    MalformedResponse {
        /// Parser message.
        reason: String,
        /// The raw body.
        body: String,
    },

    /// Persistence or mock registration failed.
    #[error("application error: {0}")]
    Application(#[from] ApplicationError),
}

impl From<DomainError> for HarnessError {
    fn from(error: DomainError) -> Self {
        Self::InvalidStep(error.to_string())
    }
}

impl From<TableError> for HarnessError {
    fn from(error: TableError) -> Self {
        Self::InvalidStep(error.to_string())
    }
}

impl From<UnknownOperation> for HarnessError {
    fn from(error: UnknownOperation) -> Self {
        Self::InvalidStep(error.to_string())
    }
}

/// Result alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
