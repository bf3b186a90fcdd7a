//! Runtime adapters (tokio) and the API surface exposed to the UI layer.

pub mod api;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_spawner;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_timer;

pub use api::{load_status, BatchStatusResponse, JobStatusView, LoadStatusResponse};
#[cfg(feature = "tokio-runtime")]
pub use tokio_spawner::TokioSpawner;
#[cfg(feature = "tokio-runtime")]
pub use tokio_timer::TokioTimer;
