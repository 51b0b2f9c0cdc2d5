//! Ask (sell-side) order book
//!
//! Maintains sell orders keyed by price. Iteration yields ascending prices,
//! so the lowest ask is first. BTreeMap keeps iteration deterministic.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::PriceLevel;

/// Ask (sell) side of a book
///
/// Levels are consumed best-first (lowest price); within a level, FIFO.
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    /// Create a new empty ask book
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

    /// Best ask price (lowest)
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Mutable access to the best level
    pub(crate) fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        self.levels.iter_mut().next().map(|(price, level)| (*price, level))
    }

    /// Delete a level outright (used when a level is emptied mid-match)
    pub(crate) fn remove_level(&mut self, price: Price) {
        self.levels.remove(&price);
    }

    /// Top-N levels, best first, as (price, total volume) pairs
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
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

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::Side;

    fn ask(id: u64, price: u64, qty: &str) -> Order {
        Order::limit(
            id,
            Side::Sell,
            "AAPL",
            Price::from_u64(price),
            Quantity::from_str(qty).unwrap(),
        )
    }

    #[test]
    fn test_best_price_is_lowest() {
        let mut book = AskBook::new();
        book.insert(&ask(1, 101, "1.0"));
        book.insert(&ask(2, 100, "2.0"));
        book.insert(&ask(3, 102, "1.5"));

        assert_eq!(book.best_price(), Some(Price::from_u64(100)));
    }

    #[test]
    fn test_remove_deletes_empty_level() {
        let mut book = AskBook::new();
        book.insert(&ask(1, 100, "1.0"));
        book.insert(&ask(2, 100, "2.0"));

        book.remove(&OrderId::new(1), Price::from_u64(100));
        assert_eq!(book.level_count(), 1);

        book.remove(&OrderId::new(2), Price::from_u64(100));
        assert!(book.is_empty());
    }

    #[test]
    fn test_depth_snapshot_best_first() {
        let mut book = AskBook::new();
        book.insert(&ask(1, 101, "1.0"));
        book.insert(&ask(2, 100, "2.0"));
        book.insert(&ask(3, 103, "1.5"));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].0, Price::from_u64(100));
        assert_eq!(depth[1].0, Price::from_u64(101));
    }

    #[test]
    fn test_empty_book_has_no_best_price() {
        let book = AskBook::new();
        assert_eq!(book.best_price(), None);
        assert_eq!(book.depth_snapshot(5).len(), 0);
    }
}
