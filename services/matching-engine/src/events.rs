//! Fill events and the sink contract
//!
//! The engine reports each match through a caller-provided [`FillSink`],
//! invoked synchronously from inside the match loop on the worker thread
//! that owns the symbol. Sinks shared across symbols must be thread-safe,
//! and must not re-enter the engine with an action for the same symbol.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use types::ids::Symbol;
use types::numeric::{Price, Quantity};
use types::order::Side;

/// A single match between a taker and a resting maker
///
/// The price is the maker's price; `taker_side` identifies which side
/// consumed liquidity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
    pub taker_side: Side,
}

impl FillEvent {
    /// Signed taker direction: +1 for a BUY taker, -1 for a SELL taker
    pub fn side_sign(&self) -> i8 {
        self.taker_side.sign()
    }
}

/// Consumer of fill events
///
/// May be called zero or more times per submitted order, in match-sequence
/// order (best price first, FIFO within a price).
pub trait FillSink: Send + Sync {
    fn on_fill(&self, fill: &FillEvent);
}

impl<F> FillSink for F
where
    F: Fn(&FillEvent) + Send + Sync,
{
    fn on_fill(&self, fill: &FillEvent) {
        self(fill)
    }
}

/// Sink that discards every fill
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FillSink for NullSink {
    fn on_fill(&self, _fill: &FillEvent) {}
}

/// Sink that buffers fills for later inspection
#[derive(Debug, Default)]
pub struct CollectingSink {
    fills: Mutex<Vec<FillEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the fills observed so far
    pub fn fills(&self) -> Vec<FillEvent> {
        self.fills.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Drain the buffered fills
    pub fn take(&self) -> Vec<FillEvent> {
        std::mem::take(&mut *self.fills.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Number of fills observed so far
    pub fn len(&self) -> usize {
        self.fills.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FillSink for CollectingSink {
    fn on_fill(&self, fill: &FillEvent) {
        self.fills
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(fill.clone());
    }
}
