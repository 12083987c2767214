//! Core Module - Classification Logic
//!
//! Referrer history, target-domain matching, parameter lookup and the
//! gtg decision.

pub mod classifier;
pub mod params;
pub mod referrer;

pub use classifier::*;
pub use params::*;
pub use referrer::*;
