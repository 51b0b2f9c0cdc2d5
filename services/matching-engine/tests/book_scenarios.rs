//! End-to-end order book scenarios
//!
//! Drives a single-symbol book through representative flows and checks the
//! externally observable state after every step: quotes, fills, resting
//! residuals, and the mirror between the order index and the price levels.

use matching_engine::{CollectingSink, NullSink, OrderBook, SubmitResult};
use std::collections::BTreeMap;
use types::prelude::*;

fn book() -> OrderBook {
    OrderBook::new(Symbol::new("AAPL"))
}

fn limit(id: u64, side: Side, price: u64, qty: u64) -> Order {
    Order::limit(id, side, "AAPL", Price::from_u64(price), Quantity::from_u64(qty))
}

fn market(id: u64, side: Side, qty: u64) -> Order {
    Order::market(id, side, "AAPL", Quantity::from_u64(qty))
}

/// Verify the book's observable consistency: every resting order is active
/// with a positive residual, each side's levels mirror the resting orders
/// exactly (price and volume), and no level is empty.
fn assert_book_consistent(book: &OrderBook) {
    let mut bid_levels: BTreeMap<Price, Quantity> = BTreeMap::new();
    let mut ask_levels: BTreeMap<Price, Quantity> = BTreeMap::new();

    for order in book.resting_orders() {
        assert!(order.is_active(), "resting order {} must be active", order.id);
        assert!(
            !order.remaining().is_zero(),
            "resting order {} must have a positive residual",
            order.id
        );
        let levels = match order.side {
            Side::Buy => &mut bid_levels,
            Side::Sell => &mut ask_levels,
        };
        let volume = levels.entry(order.price).or_insert_with(Quantity::zero);
        *volume = *volume + order.remaining();
    }

    let depth = book.depth(usize::MAX);
    let bids: BTreeMap<Price, Quantity> = depth.bids.iter().copied().collect();
    let asks: BTreeMap<Price, Quantity> = depth.asks.iter().copied().collect();

    assert_eq!(bids, bid_levels, "bid levels must mirror resting orders");
    assert_eq!(asks, ask_levels, "ask levels must mirror resting orders");

    for (price, volume) in depth.bids.iter().chain(depth.asks.iter()) {
        assert!(!volume.is_zero(), "level {price} must not be empty");
    }
}

#[test]
fn scenario_basic_add_and_best_quotes() {
    let mut book = book();
    let sink = CollectingSink::new();

    book.add(limit(1, Side::Buy, 100, 10), &sink).unwrap();
    book.add(limit(2, Side::Sell, 101, 5), &sink).unwrap();

    assert_eq!(book.best_bid(), Some(Price::from_u64(100)));
    assert_eq!(book.best_ask(), Some(Price::from_u64(101)));
    assert!(sink.is_empty());
    assert_eq!(book.order_count(), 2);
    assert!(book.resting_order(&OrderId::new(1)).is_some());
    assert!(book.resting_order(&OrderId::new(2)).is_some());
    assert_book_consistent(&book);
}

#[test]
fn scenario_crossing_limit_partial_fill() {
    let mut book = book();
    let sink = CollectingSink::new();

    book.add(limit(1, Side::Buy, 100, 10), &sink).unwrap();
    book.add(limit(2, Side::Sell, 101, 5), &sink).unwrap();

    let result = book.add(limit(3, Side::Buy, 101, 7), &sink).unwrap();
    assert_eq!(
        result,
        SubmitResult::PartiallyFilled { remaining: Quantity::from_u64(2) }
    );

    let fills = sink.fills();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].price, Price::from_u64(101));
    assert_eq!(fills[0].quantity, Quantity::from_u64(5));
    assert_eq!(fills[0].side_sign(), 1);

    // Order 2 consumed and gone; order 3 rests with residual 2 at 101
    assert!(book.resting_order(&OrderId::new(2)).is_none());
    let resting = book.resting_order(&OrderId::new(3)).unwrap();
    assert_eq!(resting.remaining(), Quantity::from_u64(2));
    assert_eq!(book.best_bid(), Some(Price::from_u64(101)));
    assert_eq!(book.best_ask(), None);
    assert_book_consistent(&book);
}

#[test]
fn scenario_fifo_within_one_level() {
    let mut book = book();
    let sink = CollectingSink::new();

    book.add(limit(10, Side::Sell, 50, 3), &sink).unwrap();
    book.add(limit(11, Side::Sell, 50, 3), &sink).unwrap();

    let result = book.add(market(12, Side::Buy, 4), &sink).unwrap();
    assert_eq!(result, SubmitResult::Filled);

    let fills = sink.fills();
    assert_eq!(fills.len(), 2);
    assert_eq!(fills[0].quantity, Quantity::from_u64(3));
    assert_eq!(fills[1].quantity, Quantity::from_u64(1));
    assert!(fills.iter().all(|f| f.price == Price::from_u64(50)));

    // The older maker is fully consumed first
    assert!(book.resting_order(&OrderId::new(10)).is_none());
    let second = book.resting_order(&OrderId::new(11)).unwrap();
    assert_eq!(second.remaining(), Quantity::from_u64(2));
    assert_book_consistent(&book);
}

#[test]
fn scenario_cancel_then_reuse_id() {
    let mut book = book();

    book.add(limit(20, Side::Buy, 90, 1), &NullSink).unwrap();

    let cancelled = book.cancel(OrderId::new(20)).unwrap();
    assert_eq!(cancelled.residual, Quantity::from_u64(1));

    assert_eq!(
        book.cancel(OrderId::new(20)).unwrap_err(),
        OrderError::UnknownOrder(OrderId::new(20))
    );
    assert_book_consistent(&book);

    // The id is free again after cancellation
    let result = book.add(limit(20, Side::Buy, 90, 1), &NullSink).unwrap();
    assert_eq!(result, SubmitResult::Resting);
    assert_eq!(book.best_bid(), Some(Price::from_u64(90)));
    assert_book_consistent(&book);
}

#[test]
fn scenario_market_sweep_across_levels() {
    let mut book = book();
    let sink = CollectingSink::new();

    book.add(limit(30, Side::Sell, 100, 2), &sink).unwrap();
    book.add(limit(31, Side::Sell, 101, 2), &sink).unwrap();
    book.add(limit(32, Side::Sell, 102, 10), &sink).unwrap();

    let result = book.add(market(40, Side::Buy, 5), &sink).unwrap();
    assert_eq!(result, SubmitResult::Filled);

    let fills = sink.fills();
    let observed: Vec<(Price, Quantity)> = fills.iter().map(|f| (f.price, f.quantity)).collect();
    assert_eq!(
        observed,
        vec![
            (Price::from_u64(100), Quantity::from_u64(2)),
            (Price::from_u64(101), Quantity::from_u64(2)),
            (Price::from_u64(102), Quantity::from_u64(1)),
        ]
    );

    // Prices seen by the sweep never improve back down
    for pair in fills.windows(2) {
        assert!(pair[0].price <= pair[1].price);
    }

    assert_eq!(book.best_ask(), Some(Price::from_u64(102)));
    let head = book.resting_order(&OrderId::new(32)).unwrap();
    assert_eq!(head.remaining(), Quantity::from_u64(9));
    assert_book_consistent(&book);
}

#[test]
fn scenario_duplicate_id_leaves_book_unchanged() {
    let mut book = book();
    let sink = CollectingSink::new();

    book.add(limit(50, Side::Buy, 100, 1), &sink).unwrap();
    let depth_before = book.depth(usize::MAX);

    let err = book.add(limit(50, Side::Buy, 100, 2), &sink).unwrap_err();
    assert_eq!(err, OrderError::DuplicateId(OrderId::new(50)));

    assert_eq!(book.depth(usize::MAX), depth_before);
    assert!(sink.is_empty());
    let resting = book.resting_order(&OrderId::new(50)).unwrap();
    assert_eq!(resting.quantity, Quantity::from_u64(1));
    assert_book_consistent(&book);
}

#[test]
fn scenario_decimal_prices_share_levels() {
    let mut book = book();
    let sink = CollectingSink::new();

    // The same price written two ways lands on one level
    let first = Order::limit(
        1,
        Side::Sell,
        "AAPL",
        Price::from_str("3200.10").unwrap(),
        Quantity::from_u64(1),
    );
    let second = Order::limit(
        2,
        Side::Sell,
        "AAPL",
        Price::from_str("3200.1").unwrap(),
        Quantity::from_u64(1),
    );
    book.add(first, &sink).unwrap();
    book.add(second, &sink).unwrap();

    let depth = book.depth(usize::MAX);
    assert_eq!(depth.asks.len(), 1);
    assert_eq!(depth.asks[0].1, Quantity::from_u64(2));
    assert_book_consistent(&book);
}
