//! Order record and lifecycle
//!
//! An order is created externally, submitted to the engine, possibly rests in
//! a price level, and ends in a terminal state (filled, cancelled, or
//! rejected). It is never re-activated.

use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Signed direction used in fill reporting: +1 for Buy, -1 for Sell
    pub fn sign(&self) -> i8 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type
///
/// Only Limit and Market are matched. StopLimit is a retained tag: the record
/// carries it (with an optional trigger price) but the engine rejects it as
/// unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLimit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

/// An identified trading intention
///
/// Identity fields are immutable after construction; `filled` and `active`
/// track fill state. The order does not know which book or level it lives
/// in — the engine maintains that linkage from `price + side + symbol`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
    pub filled: Quantity,
    /// Trigger price for StopLimit orders; never interpreted by the engine
    pub stop_price: Option<Price>,
    pub active: bool,
}

impl Order {
    /// Create a new active order
    pub fn new(
        id: OrderId,
        side: Side,
        order_type: OrderType,
        symbol: Symbol,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id,
            side,
            order_type,
            symbol,
            price,
            quantity,
            filled: Quantity::zero(),
            stop_price: None,
            active: true,
        }
    }

    /// Create a limit order
    pub fn limit(id: u64, side: Side, symbol: impl Into<Symbol>, price: Price, quantity: Quantity) -> Self {
        Self::new(OrderId::new(id), side, OrderType::Limit, symbol.into(), price, quantity)
    }

    /// Create a market order (price is ignored during matching)
    pub fn market(id: u64, side: Side, symbol: impl Into<Symbol>, quantity: Quantity) -> Self {
        Self::new(OrderId::new(id), side, OrderType::Market, symbol.into(), Price::zero(), quantity)
    }

    /// Unfilled remainder of the order
    pub fn remaining(&self) -> Quantity {
        self.quantity - self.filled
    }

    /// Check if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled == self.quantity
    }

    /// Check if the order is still live
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the filled amount
    ///
    /// # Panics
    /// Panics if the fill would exceed the order quantity
    pub fn fill(&mut self, amount: Quantity) {
        let new_filled = self.filled + amount;
        assert!(
            new_filled <= self.quantity,
            "Fill would exceed order quantity"
        );
        self.filled = new_filled;
    }

    /// Mark the order terminal (idempotent)
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
