use crate::order::{id::OrderId, state::OrderStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors generated by order mutations.
///
/// All variants are non-fatal and recoverable by the caller: re-prompt for `Validation`,
/// reconcile UI state from the `from` status for `InvalidTransition`, retry for `Store`.
#[derive(Error, Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub enum OrderError {
    #[error("invalid participant details: {0}")]
    Validation(String),

    #[error("failed to find Order with OrderId: {0}")]
    NotFound(OrderId),

    #[error("transition to {to} is not permitted from current status: {from}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order store failure: {0}")]
    Store(#[from] StoreError),
}

/// Errors generated by an [`OrderStore`](crate::store::OrderStore) implementation.
#[derive(Error, Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(String),

    #[error("serialisation: {0}")]
    Serde(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serde(error.to_string())
    }
}
