//! Withdrawal fee calculator and form state.
//!
//! The calculator is a pure function of the typed amount, the live balances
//! and the backend's fee schedule. The form layers the submission checks and
//! the hand-off to the backend on top of it.

pub mod calculator;
pub mod error;
pub mod form;
pub mod types;

pub use calculator::*;
pub use error::*;
pub use form::*;
pub use types::*;
