//! Timer backends.

pub mod manual;

pub use manual::ManualTimer;
