//! Shared types for the order matching engine
//!
//! Everything the engine and its callers exchange lives here: identifiers,
//! fixed-point numerics, the order record, and the error taxonomy.
//!
//! # Modules
//! - `ids`: identifiers (OrderId, Symbol)
//! - `numeric`: fixed-point decimal types (Price, Quantity)
//! - `order`: order record and lifecycle
//! - `errors`: error taxonomy

pub mod errors;
pub mod ids;
pub mod numeric;
pub mod order;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
}
