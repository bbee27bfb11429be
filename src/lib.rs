//! Wheel-strategy options backtester
//!
//! Simulates selling a cash-secured put each trading day, taking assignment
//! when the underlying closes below the strike, and selling a covered call
//! against the assigned shares. Every entry date is an independent trial;
//! positions are never carried across days. A parameter sweep ranks put
//! strike offsets by total profit.

pub mod loader;
pub mod models;
pub mod output;
pub mod selector;
pub mod simulator;
pub mod stats;
pub mod sweep;
