//! Order matching engine
//!
//! Maintains one limit order book per symbol, matches crossing orders with
//! price-time priority, and shards work across symbols so that each book is
//! processed serially while different symbols progress in parallel.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced (best price first, FIFO within a
//!   price level)
//! - Fills execute at the resting order's price
//! - A level's total volume always equals the sum of its residuals
//! - Per-symbol actions are applied in submission order
//!
//! The engine is a library: callers submit [`types::order::Order`] values to
//! a [`BookDispatcher`] (or drive an [`OrderBook`] directly) and observe
//! fills through a [`FillSink`].

pub mod book;
pub mod dispatch;
pub mod engine;
pub mod events;
pub mod matching;

pub use dispatch::{BookDispatcher, DispatcherConfig};
pub use engine::{BookDepth, CancelledOrder, OrderBook, SubmitResult};
pub use events::{CollectingSink, FillEvent, FillSink, NullSink};
