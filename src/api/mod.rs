//! Mines HTTP API
//!
//! JSON endpoints over `GameService` plus health, fairness tooling and
//! Prometheus metrics.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::ApiServer;
