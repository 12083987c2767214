//! Utils Module - Shared Helpers
//!
//! Constants and the session store used across the service.

pub mod constants;
pub mod session;

pub use constants::*;
pub use session::*;
