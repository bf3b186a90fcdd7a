//! Core scheduling components and the host capabilities they consume.

pub mod batch_uploader;
pub mod capability;
pub mod error;
pub mod events;
pub mod geometry;
pub mod rate_limiter;
pub mod visibility_loader;
pub mod window;

pub use batch_uploader::{
    BatchReport, BatchSummary, BatchUploader, CompletedUpload, JobStatus, TrackedUploads,
    UploadContext, UploadFile, UploadJob, UploadPolicy, UploadedResource,
};
pub use capability::{
    IntersectionCallback, IntersectionEntry, NoViewportObserver, ObjectStorage, ObserveOptions,
    ResourceFetcher, Spawn, Subscription, TargetId, Timer, TimerCallback, TimerHandle,
    UploadReceipt, ViewportObserver,
};
pub use error::{AppResult, LoaderError, TransportError, UploadError, ValidationError};
pub use events::{
    build_event, shared_sink, EventKind, EventSink, InMemoryEventSink, LoadgateEvent,
    SharedEventSink, TracingEventSink,
};
pub use geometry::{intersect, Length, Rect, RootMargin};
pub use rate_limiter::{debounce, throttle, Debounced, Throttled};
pub use visibility_loader::{LoadState, LoadTarget, RenderHint, VisibilityLoader};
pub use window::{compute_visible_range, VisibleWindow, WindowCalculator};
