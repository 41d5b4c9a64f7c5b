use camino::Utf8Path;
use stager_core::diff::diff as diff_listings;
use stager_core::{ChangeSet, Side};
use stager_infra::HashCache;
use stager_scanner::Scanner;
use std::fs;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::staging::StagingArea;
use crate::sync::{
    download, install, CycleOutcome, CycleReport, SyncError, SyncOptions, UpdateRequest,
};
use crate::tracker::{Phase, Progress, ProgressEvent};

/// Drives one update cycle: diff, stage, install.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    cache: HashCache,
    options: SyncOptions,
}

impl SyncEngine {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            cache: HashCache::new(options.sidecars),
            options,
        }
    }

    /// Compare the two trees. The target is created when absent; the source must exist.
    pub fn diff(&self, source: &Utf8Path, target: &Utf8Path) -> Result<ChangeSet, SyncError> {
        if !source.is_dir() {
            return Err(SyncError::SourceMissing(source.to_path_buf()));
        }
        if !target.is_dir() {
            fs::create_dir_all(target).map_err(|e| SyncError::Io {
                path: target.to_path_buf(),
                source: e,
            })?;
        }

        let source_listing = Scanner::list(source)?;
        let target_listing = Scanner::list(target)?;

        let changes = diff_listings(&source_listing, &target_listing, |side, rel| {
            let root = match side {
                Side::Source => source,
                Side::Target => target,
            };
            Scanner::checksum(root, rel, &self.cache)
        })?;
        Ok(changes)
    }

    /// Check step. `Ok(None)` when there is no source tree to check against.
    pub fn check(
        &self,
        req: &UpdateRequest,
        progress: Progress<'_>,
    ) -> Result<Option<ChangeSet>, SyncError> {
        let Some(source) = req.source.as_deref().filter(|s| s.is_dir()) else {
            info!("Source folder not available, skipping update check");
            return Ok(None);
        };

        info!("Start check updates");
        progress.started(Phase::Checking, 0);
        let changes = self.diff(source, &req.target);
        progress.finished(Phase::Checking);
        let changes = changes?;

        info!("Items Changes count = {}:", changes.len());
        for record in &changes {
            info!("- {}", record);
        }
        info!("Finish check updates");

        Ok(Some(changes))
    }

    /// Stage every changed file, install, and remove the staging area on the way out.
    pub fn apply(
        &self,
        changes: &ChangeSet,
        source: &Utf8Path,
        target: &Utf8Path,
        progress: Progress<'_>,
    ) -> Result<CycleReport, SyncError> {
        let prefix = &self.options.staging_prefix;
        let staging = match &self.options.staging_parent {
            Some(parent) => StagingArea::create(parent, prefix),
            None => StagingArea::create_in_temp(prefix),
        }
        .map_err(SyncError::Staging)?;

        let download = download::download(changes, source, staging.path(), progress);
        let install = install::install(changes, staging.path(), target, &self.cache, progress);

        if let Err(e) = staging.close() {
            warn!("Failed to delete temp folder: {}", e);
        }

        Ok(CycleReport {
            changes: changes.clone(),
            download,
            install,
        })
    }

    /// The whole cycle on the calling thread.
    pub fn run_update_cycle_blocking(
        &self,
        req: &UpdateRequest,
        progress: Progress<'_>,
    ) -> Result<CycleOutcome, SyncError> {
        let changes = match self.check(req, progress)? {
            Some(changes) => changes,
            None => return Ok(CycleOutcome::SourceMissing),
        };
        if changes.is_empty() {
            return Ok(CycleOutcome::UpToDate);
        }

        // check() only yields a change set when the source is present.
        let Some(source) = req.source.as_deref() else {
            return Ok(CycleOutcome::SourceMissing);
        };

        let report = self.apply(&changes, source, &req.target, progress)?;
        if report.skipped() > 0 {
            warn!("{} item(s) skipped during update", report.skipped());
        }
        Ok(CycleOutcome::Updated(report))
    }

    /// Run the cycle as a single background unit of work and hand the outcome back.
    pub async fn run_update_cycle(
        &self,
        req: UpdateRequest,
        progress_tx: Option<UnboundedSender<ProgressEvent>>,
    ) -> Result<CycleOutcome, SyncError> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || {
            engine.run_update_cycle_blocking(&req, Progress::new(progress_tx.as_ref()))
        })
        .await
        .map_err(|e| SyncError::Join(e.to_string()))?
    }
}
