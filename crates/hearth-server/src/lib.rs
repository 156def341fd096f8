//! Hearth Server - SpacetimeDB Module
//!
//! Authoritative host for placed fireplaces. Fuel decay and environment
//! checks run as scheduled reducers; players act through reducers and read
//! the resulting rows. All fireplace rules live in `hearth-logic`.

mod reducers;
mod tables;

pub use reducers::*;
pub use tables::*;
