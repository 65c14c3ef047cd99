//! Tradebook Common Types
//!
//! This crate contains shared types used across the Tradebook crates,
//! including currency codes, amount helpers, identifiers and trade records.

pub mod identifiers;
pub mod monetary;
pub mod trade;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use monetary::*;
pub use trade::*;
pub use error::*;
pub use time::*;
