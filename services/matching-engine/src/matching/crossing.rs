//! Crossing detection logic
//!
//! A taker crosses when its price meets or improves the best opposing price:
//! a BUY taker crosses an ask priced at or below its limit, a SELL taker
//! crosses a bid priced at or above its limit. Market orders skip the price
//! check entirely and only stop when the opposite side is exhausted.

use types::numeric::Price;
use types::order::Side;

/// Check whether a limit taker's price crosses the best opposing price
pub fn crosses(taker_side: Side, taker_price: Price, best_opposing: Price) -> bool {
    match taker_side {
        Side::Buy => taker_price >= best_opposing,
        Side::Sell => taker_price <= best_opposing,
    }
}
