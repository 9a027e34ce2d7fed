//! `throttle` limits how many requests of a URL scope may be in flight at
//! once. Requests beyond the ceiling are turned away with `503 Service
//! Unavailable` instead of being queued.
//!
//! ```
//! use std::str::FromStr;
//! use throttle_lib::{Decision, Result, Throttle, scope::ScopeConfigs, snapshot::Scoreboard};
//!
//! fn main() -> Result<()> {
//!   let scopes = ScopeConfigs::from_str(
//!       r#"
//!       [scopes."/api"]
//!       methods = ["GET", "POST"]
//!       max_concurrent_reqs = 1
//!       "#,
//!   )?;
//!   let board = Scoreboard::new(8);
//!   let throttle = Throttle::new(scopes, &board);
//!
//!   let request = http::Request::get("/api/items").body(()).unwrap();
//!   assert_eq!(throttle.check_request(&request)?, Decision::Admit);
//!
//!   // Once a worker serves `/api/items`, the scope is full
//!   let _slot = board.claim("GET /api/items HTTP/1.1");
//!   assert!(throttle.check_request(&request)?.is_reject());
//!   Ok(())
//! }
//! ```
// #![deny(missing_docs)]

#[cfg(doctest)]
doc_comment::doctest!("../../README.md");

mod types;

pub mod admission;
pub mod scope;
pub mod snapshot;

pub use admission::{AdmissionController, Throttle};
pub use types::*;
