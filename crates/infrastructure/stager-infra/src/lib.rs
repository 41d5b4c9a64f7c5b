pub mod hashing;
pub mod launcher;

// Re-exports for convenience
pub use hashing::{compute_file_checksum, HashCache, HashError, SidecarPolicy};
pub use launcher::{LaunchError, LaunchOutcome, Launcher};
