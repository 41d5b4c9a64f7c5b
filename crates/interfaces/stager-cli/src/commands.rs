use crate::progress::{self, ProgressView};
use crate::CliSidecarPolicy;
use anyhow::{Context, Result};
use camino::Utf8Path;
use stager_config::{ResolvedSettings, STAGING_PREFIX};
use stager_core::ChangeSet;
use stager_infra::{HashCache, LaunchOutcome, Launcher};
use stager_pipeline::{CycleOutcome, Progress, SyncEngine, SyncOptions, UpdateRequest};
use tracing::{error, info, warn};

/// What a `run` invocation did, for callers that want more than the printed summary.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// `None` when the update cycle failed and was skipped.
    pub outcome: Option<CycleOutcome>,
    /// `None` when no executable is configured or launching was disabled. A launch that failed
    /// holds the logged error message.
    pub launch: Option<Result<LaunchOutcome, String>>,
}

fn engine_for(sidecars: CliSidecarPolicy) -> SyncEngine {
    SyncEngine::new(SyncOptions {
        sidecars: sidecars.into(),
        staging_prefix: STAGING_PREFIX.to_string(),
        ..SyncOptions::default()
    })
}

fn request_for(settings: &ResolvedSettings) -> UpdateRequest {
    UpdateRequest {
        source: settings.source.clone(),
        target: settings.target.clone(),
    }
}

fn print_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::SourceMissing => println!(":: Source not available, update skipped"),
        CycleOutcome::UpToDate => println!(":: Up to date"),
        CycleOutcome::Updated(report) => {
            let s = report.changes.summary();
            println!(":: Update complete");
            println!("   Added:   {} files, {} folders", s.new_files, s.new_folders);
            println!("   Updated: {} files", s.updated_files);
            println!(
                "   Deleted: {} files, {} folders",
                s.deleted_files, s.deleted_folders
            );
            if report.skipped() > 0 {
                println!("   Skipped: {}", report.skipped());
                for w in report.warnings() {
                    println!("     - {}", w);
                }
            }
        }
    }
}

/// Update the target from the source, then start the configured executable.
/// A failed update or launch is logged and the run still completes.
pub async fn cmd_run(
    settings: &ResolvedSettings,
    sidecars: CliSidecarPolicy,
    launch: bool,
    view: ProgressView,
) -> Result<RunSummary> {
    info!(
        "Resolved settings: source={:?}, target={}, execute={:?}, args={:?}",
        settings.source, settings.target, settings.executable, settings.launch_args
    );

    let engine = engine_for(sidecars);
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let renderer = tokio::spawn(progress::drive(rx, view));

    let result = engine.run_update_cycle(request_for(settings), Some(tx)).await;
    renderer.await.context("Progress renderer failed")?;

    let outcome = match result {
        Ok(outcome) => {
            print_outcome(&outcome);
            Some(outcome)
        }
        Err(e) => {
            error!("Update failed: {}", e);
            None
        }
    };

    let launch = match (&settings.executable, launch) {
        (Some(exe), true) => Some(launch_program(exe, &settings.launch_args)),
        _ => None,
    };

    info!("Finish program");
    Ok(RunSummary { outcome, launch })
}

fn launch_program(exe: &Utf8Path, args: &str) -> Result<LaunchOutcome, String> {
    info!("Start opening file");
    let outcome = Launcher::new(exe, args).launch();
    match &outcome {
        Ok(LaunchOutcome::Spawned { pid }) => info!("Started {} (pid {})", exe, pid),
        Ok(LaunchOutcome::Missing(path)) => warn!("File for start not found: {}", path),
        Err(e) => error!("Failed to launch {}: {}", exe, e),
    }
    info!("Finish opening file");
    outcome.map_err(|e| e.to_string())
}

/// Report pending changes without touching the target. `None` when there is no source.
pub async fn cmd_check(
    settings: &ResolvedSettings,
    sidecars: CliSidecarPolicy,
    json: bool,
) -> Result<Option<ChangeSet>> {
    let engine = engine_for(sidecars);
    let req = request_for(settings);

    let changes = tokio::task::spawn_blocking(move || engine.check(&req, Progress::none()))
        .await
        .context("Check task failed")??;

    match &changes {
        None if json => println!("null"),
        None => println!(":: Source not available"),
        Some(changes) if json => println!("{}", serde_json::to_string_pretty(changes)?),
        Some(changes) => {
            println!(":: Pending changes: {}", changes.len());
            for record in changes {
                println!("   {}", record);
            }
        }
    }

    Ok(changes)
}

/// Print the hash the differ would use for `path`.
pub fn cmd_hash(path: &Utf8Path, sidecars: CliSidecarPolicy) -> Result<String> {
    let hash = HashCache::new(sidecars.into())
        .hash_of(path)
        .with_context(|| format!("Failed to hash {path}"))?;
    println!("{}  {}", hash, path);
    Ok(hash)
}
