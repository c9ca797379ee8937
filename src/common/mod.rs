//! Common utilities and shared functionality
//!
//! Interfaces shared between the game engine, the storage backends and the API.

pub mod traits;

pub use traits::{Clock, SessionStore, SystemClock};
