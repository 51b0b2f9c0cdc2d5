//! Matching logic module
//!
//! Crossing detection for the price-time priority match loop.

pub mod crossing;

pub use crossing::crosses;
