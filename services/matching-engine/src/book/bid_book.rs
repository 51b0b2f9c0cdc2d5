//! Bid (buy-side) order book
//!
//! Maintains buy orders keyed by price. Iteration yields descending prices,
//! so the highest bid is first. BTreeMap keeps iteration deterministic.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::PriceLevel;

/// Bid (buy) side of a book
///
/// Levels are consumed best-first (highest price); within a level, FIFO.
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    /// Create a new empty bid book
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Insert an order, creating its level if needed
    pub fn insert(&mut self, order: &Order) {
        let level = self
            .levels
            .entry(order.price)
            .or_insert_with(|| PriceLevel::new(order.price));
        level.push_back(order.id, order.remaining());
    }

    /// Remove an order from its level, deleting the level if it empties
    ///
    /// Returns the residual released, or None if the order was not found.
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> Option<Quantity> {
        let level = self.levels.get_mut(&price)?;
        let residual = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(residual)
    }

    /// Best bid price (highest)
    pub fn best_price(&self) -> Option<Price> {
        // BTreeMap iterates ascending, so the best bid is the last key
        self.levels.keys().next_back().copied()
    }

    /// Mutable access to the best level
    pub(crate) fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        self.levels.iter_mut().next_back().map(|(price, level)| (*price, level))
    }

    /// Delete a level outright (used when a level is emptied mid-match)
    pub(crate) fn remove_level(&mut self, price: Price) {
        self.levels.remove(&price);
    }

    /// Top-N levels, best first, as (price, total volume) pairs
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .rev()
            .take(depth)
            .map(|(price, level)| (*price, level.total_volume()))
            .collect()
    }

    /// Check if the side has no levels
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of price levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
