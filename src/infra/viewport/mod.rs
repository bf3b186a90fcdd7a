//! Viewport-observation backends.

pub mod manual;

pub use manual::ManualViewportObserver;
