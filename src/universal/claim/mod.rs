//! Daily bonus claim flow.
//!
//! idle -> counting (10 s) -> claiming -> success | cooldown | error -> idle.
//!
//! `ClaimMachine` holds the transitions and is driven by explicit ticks;
//! `ClaimModal` runs it against tokio time and the backend claim call.

pub mod clock;
pub mod error;
pub mod machine;
pub mod modal;
pub mod types;

pub use clock::*;
pub use error::*;
pub use machine::*;
pub use modal::*;
pub use types::*;
