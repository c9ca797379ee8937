//! Mines - a provably fair wager game engine
//!
//! A 5x5 board hides a chosen number of mines. Players reveal tiles one at a
//! time; every safe reveal raises the payout multiplier, a mine loses the bet,
//! and cashing out locks in the current winnings.
//!
//! - `games`: board generation, payout schedule, session state machine and
//!   the `GameService` orchestrating them against a store
//! - `storage`: in-memory and RocksDB session stores with expiry
//! - `api`: axum HTTP surface
//! - `config`, `factory`, `metrics`: ambient plumbing

pub mod api;
pub mod common;
pub mod config;
pub mod errors;
pub mod factory;
pub mod games;
pub mod metrics;
pub mod storage;

pub use config::MinesConfig;
pub use errors::{GameError, MinesError, MinesResult, StoreError};
pub use factory::ServiceFactory;
pub use games::{GameService, GameSession, SessionId};
