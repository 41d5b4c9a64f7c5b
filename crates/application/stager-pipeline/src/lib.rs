mod io_utils;
pub mod staging;
pub mod sync;
pub mod tracker;

// Re-export core engine components
pub use staging::StagingArea;
pub use sync::{
    CycleOutcome, CycleReport, DownloadReport, InstallReport, ItemWarning, SyncEngine, SyncError,
    SyncOptions, UpdateRequest, WarningReason,
};
pub use tracker::{Phase, Progress, ProgressEvent, ProgressSnapshot, ProgressTracker};

// Re-export types consumers usually need alongside the engine
pub use stager_core::{ChangeKind, ChangeRecord, ChangeSet};
pub use stager_infra::SidecarPolicy;
