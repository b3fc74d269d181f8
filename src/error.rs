//! Error taxonomy for the layout/routing/rasterization pipeline.
//!
//! The teacher returns bare `Result<_, String>` everywhere; this crate follows
//! the pack's `freddiehaddad-oxidized` convention of a `thiserror`-derived enum
//! instead, one variant per error kind the core distinguishes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("routing failure: no path found from {from} to {to}")]
    RoutingFailure { from: String, to: String },

    #[error("internal inconsistency: {0}")]
    Internal(String),
}

impl GraphError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        GraphError::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        GraphError::Internal(msg.into())
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
