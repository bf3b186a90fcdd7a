//! Infrastructure adapters: deterministic in-memory host capabilities.

pub mod fetch;
pub mod spawn;
pub mod storage;
pub mod timer;
pub mod viewport;

pub use fetch::InMemoryFetcher;
pub use spawn::ManualSpawner;
pub use storage::InMemoryStorage;
pub use timer::ManualTimer;
pub use viewport::ManualViewportObserver;
