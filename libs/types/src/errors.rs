//! Error taxonomy for the matching engine
//!
//! No error here is fatal: a rejected add or cancel leaves the book exactly
//! as it was, and the dispatcher keeps serving other symbols.

use crate::ids::{OrderId, Symbol};
use crate::order::OrderType;
use thiserror::Error;

/// Rejections produced by book operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order is not active")]
    Inactive,

    #[error("order quantity must be positive")]
    InvalidQuantity,

    #[error("order type {0} is not supported")]
    UnsupportedType(OrderType),

    #[error("duplicate order id: {0}")]
    DuplicateId(OrderId),

    #[error("order symbol {order} does not match book symbol {book}")]
    WrongSymbol { order: Symbol, book: Symbol },

    #[error("unknown order id: {0}")]
    UnknownOrder(OrderId),
}

/// Rejections produced at the dispatcher boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatcher has been shut down")]
    Stopped,
}
