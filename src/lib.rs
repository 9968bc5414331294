//! Client core for the referral earning portal: the withdrawal fee
//! calculator, the daily bonus claim flow, payload normalization and typed
//! access to the backend REST API.

pub mod common;
pub mod services;
pub mod universal;
