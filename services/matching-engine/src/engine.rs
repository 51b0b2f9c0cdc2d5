//! Per-symbol order book and matching core
//!
//! Orchestrates add/cancel/match over the book sides with price-time
//! priority: best price first, oldest order first within a price. Fills
//! always execute at the resting order's price.
//!
//! The order index doubles as the arena owning resting order state; price
//! levels cache residuals and are kept in sync by the match loop, so the
//! book's volume accounting holds at every observable moment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use types::errors::OrderError;
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};

use crate::book::{AskBook, BidBook};
use crate::events::{FillEvent, FillSink};
use crate::matching::crossing;

/// A single-symbol limit order book with matching
pub struct OrderBook {
    symbol: Symbol,
    bids: BidBook,
    asks: AskBook,
    /// Resting orders by id; an id is present iff the order is on the book
    orders: HashMap<OrderId, Order>,
}

/// Outcome of a successfully accepted order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// No fills; the limit order was posted to the book
    Resting,
    /// Some fills; the limit remainder was posted to the book
    PartiallyFilled { remaining: Quantity },
    /// The taker was completely filled and never posted
    Filled,
    /// A market order exhausted the opposite side; the remainder is
    /// deactivated, not posted
    Unfilled { remaining: Quantity },
}

/// A cancelled order together with the residual it released
#[derive(Debug, Clone, PartialEq)]
pub struct CancelledOrder {
    pub order: Order,
    pub residual: Quantity,
}

/// Top-of-book snapshot: best-first (price, volume) pairs per side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDepth {
    pub symbol: Symbol,
    pub bids: Vec<(Price, Quantity)>,
    pub asks: Vec<(Price, Quantity)>,
}

impl OrderBook {
    /// Create an empty book for a symbol
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BidBook::new(),
            asks: AskBook::new(),
            orders: HashMap::new(),
        }
    }

    /// Submit an order to the book
    ///
    /// The order is matched against the opposite side; each fill is reported
    /// to `sink` before the next maker is examined. A limit remainder is
    /// posted to the book; a market remainder is deactivated and dropped.
    ///
    /// Rejections leave the book untouched.
    pub fn add(&mut self, mut order: Order, sink: &dyn FillSink) -> Result<SubmitResult, OrderError> {
        if !order.is_active() {
            return Err(OrderError::Inactive);
        }
        if order.quantity.is_zero() {
            return Err(OrderError::InvalidQuantity);
        }
        if order.order_type == OrderType::StopLimit {
            return Err(OrderError::UnsupportedType(order.order_type));
        }
        if self.orders.contains_key(&order.id) {
            return Err(OrderError::DuplicateId(order.id));
        }
        if order.symbol != self.symbol {
            return Err(OrderError::WrongSymbol {
                order: order.symbol,
                book: self.symbol.clone(),
            });
        }

        let filled_before = order.filled;
        match order.side {
            Side::Buy => {
                Self::match_buy(&self.symbol, &mut self.asks, &mut self.orders, &mut order, sink)
            }
            Side::Sell => {
                Self::match_sell(&self.symbol, &mut self.bids, &mut self.orders, &mut order, sink)
            }
        }

        if order.is_filled() {
            order.deactivate();
            return Ok(SubmitResult::Filled);
        }

        let remaining = order.remaining();
        if order.order_type == OrderType::Market {
            // Never posted; the fill stream simply underfills.
            order.deactivate();
            return Ok(SubmitResult::Unfilled { remaining });
        }

        let had_fills = order.filled > filled_before;
        match order.side {
            Side::Buy => self.bids.insert(&order),
            Side::Sell => self.asks.insert(&order),
        }
        self.orders.insert(order.id, order);

        if had_fills {
            Ok(SubmitResult::PartiallyFilled { remaining })
        } else {
            Ok(SubmitResult::Resting)
        }
    }

    /// Cancel a resting order
    ///
    /// The order is deactivated and removed from its level; the level is
    /// deleted if it empties. A second cancel of the same id reports
    /// `UnknownOrder`.
    pub fn cancel(&mut self, order_id: OrderId) -> Result<CancelledOrder, OrderError> {
        let mut order = self
            .orders
            .remove(&order_id)
            .ok_or(OrderError::UnknownOrder(order_id))?;
        order.deactivate();

        let residual = match order.side {
            Side::Buy => self.bids.remove(&order_id, order.price),
            Side::Sell => self.asks.remove(&order_id, order.price),
        }
        .expect("resting order missing from its price level");

        Ok(CancelledOrder { order, residual })
    }

    /// Match an incoming buy against the asks, best (lowest) price first
    fn match_buy(
        symbol: &Symbol,
        asks: &mut AskBook,
        index: &mut HashMap<OrderId, Order>,
        taker: &mut Order,
        sink: &dyn FillSink,
    ) {
        while !taker.is_filled() {
            let Some((level_price, level)) = asks.best_level_mut() else {
                break;
            };
            if taker.order_type == OrderType::Limit
                && !crossing::crosses(Side::Buy, taker.price, level_price)
            {
                break;
            }

            let Some((maker_id, maker_remaining)) = level.peek_front() else {
                // A level is deleted when its last order leaves, so this
                // branch only fires if the book was corrupted; drop the level.
                asks.remove_level(level_price);
                continue;
            };

            let fill_qty = taker.remaining().min(maker_remaining);
            taker.fill(fill_qty);
            level.fill_front(fill_qty);
            let level_emptied = level.is_empty();

            let maker = index
                .get_mut(&maker_id)
                .expect("resting order missing from index");
            maker.fill(fill_qty);
            let maker_filled = maker.is_filled();
            if maker_filled {
                maker.deactivate();
            }

            sink.on_fill(&FillEvent {
                symbol: symbol.clone(),
                price: level_price,
                quantity: fill_qty,
                taker_side: Side::Buy,
            });

            if maker_filled {
                index.remove(&maker_id);
            }
            if level_emptied {
                asks.remove_level(level_price);
            }
        }
    }

    /// Match an incoming sell against the bids, best (highest) price first
    fn match_sell(
        symbol: &Symbol,
        bids: &mut BidBook,
        index: &mut HashMap<OrderId, Order>,
        taker: &mut Order,
        sink: &dyn FillSink,
    ) {
        while !taker.is_filled() {
            let Some((level_price, level)) = bids.best_level_mut() else {
                break;
            };
            if taker.order_type == OrderType::Limit
                && !crossing::crosses(Side::Sell, taker.price, level_price)
            {
                break;
            }

            let Some((maker_id, maker_remaining)) = level.peek_front() else {
                bids.remove_level(level_price);
                continue;
            };

            let fill_qty = taker.remaining().min(maker_remaining);
            taker.fill(fill_qty);
            level.fill_front(fill_qty);
            let level_emptied = level.is_empty();

            let maker = index
                .get_mut(&maker_id)
                .expect("resting order missing from index");
            maker.fill(fill_qty);
            let maker_filled = maker.is_filled();
            if maker_filled {
                maker.deactivate();
            }

            sink.on_fill(&FillEvent {
                symbol: symbol.clone(),
                price: level_price,
                quantity: fill_qty,
                taker_side: Side::Sell,
            });

            if maker_filled {
                index.remove(&maker_id);
            }
            if level_emptied {
                bids.remove_level(level_price);
            }
        }
    }

    /// Symbol this book trades
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Best bid price, if any
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Best ask price, if any
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Spread between best ask and best bid; None if either side is empty
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Snapshot of the top `depth` levels per side
    pub fn depth(&self, depth: usize) -> BookDepth {
        BookDepth {
            symbol: self.symbol.clone(),
            bids: self.bids.depth_snapshot(depth),
            asks: self.asks.depth_snapshot(depth),
        }
    }

    /// Number of resting orders on the book
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Look up a resting order by id
    pub fn resting_order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Iterate over all resting orders (unordered)
    pub fn resting_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }
}
