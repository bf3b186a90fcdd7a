//! Builders to construct scheduling components from configuration.

pub mod component_builder;

pub use component_builder::{
    build_debouncer, build_loader, build_throttler, build_upload_context, build_uploader,
    build_window_calculator,
};
