//! Mines game engine
//!
//! Pure board generation, payout schedules and session transitions, plus the
//! `GameService` that runs them against a session store.

pub mod fairness;
pub mod field;
pub mod payout;
pub mod service;
pub mod session;
pub mod simulation;
pub mod types;

pub use fairness::{verify_field, FieldVerification, ServerSeed};
pub use field::FieldGenerator;
pub use payout::{PayoutScheduler, DEFAULT_HOUSE_EDGE};
pub use service::{GameService, SessionLocks};
pub use session::{GameRules, RevealOutcome};
pub use types::*;
