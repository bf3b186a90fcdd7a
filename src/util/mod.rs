//! Shared utilities.

pub mod clock;
pub mod keys;
pub mod telemetry;

pub use clock::*;
pub use keys::*;
pub use telemetry::*;
