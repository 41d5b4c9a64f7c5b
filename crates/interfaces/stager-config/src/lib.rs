//! Runtime settings and defaults for the updater.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// File name looked up next to the executable and in the user config directory.
pub const SETTINGS_FILE_NAME: &str = "stager.json";

/// Prefix of per-run staging directories under the system temp directory.
pub const STAGING_PREFIX: &str = "stager";

/// Settings as stored on disk. Every value is optional; blanks count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    #[serde(rename = "FolderSource", default)]
    pub source_dir: Option<String>,
    #[serde(rename = "FolderTarget", default)]
    pub target_dir: Option<String>,
    #[serde(default)]
    pub execute_file: Option<String>,
    #[serde(default)]
    pub launch_args: Option<String>,
}

/// Settings after defaults and normalization have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub source: Option<Utf8PathBuf>,
    pub target: Utf8PathBuf,
    pub executable: Option<Utf8PathBuf>,
    pub launch_args: String,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
}

/// Drop trailing separators while keeping a bare root intact.
fn trim_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !path.is_empty() {
        &path[..1]
    } else {
        trimmed
    }
}

impl Settings {
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {path}"))?;
        serde_json::from_str(&data).with_context(|| format!("Invalid settings file {path}"))
    }

    /// Load from `explicit` when given, otherwise from the first default location that exists.
    /// No file at all yields empty settings.
    pub fn discover(explicit: Option<&Utf8Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        for candidate in default_locations() {
            if candidate.is_file() {
                info!("Using settings file {}", candidate);
                return Self::load(&candidate);
            }
            debug!("No settings at {}", candidate);
        }
        Ok(Self::default())
    }

    /// Values set in `overrides` win over values in `self`.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            source_dir: overrides.source_dir.or(self.source_dir),
            target_dir: overrides.target_dir.or(self.target_dir),
            execute_file: overrides.execute_file.or(self.execute_file),
            launch_args: overrides.launch_args.or(self.launch_args),
        }
    }

    pub fn resolve(&self, cwd: &Utf8Path) -> ResolvedSettings {
        let source = non_blank(&self.source_dir)
            .map(|s| Utf8PathBuf::from(trim_separators(s.trim())));
        // Relative targets are anchored at `cwd`.
        let target = non_blank(&self.target_dir)
            .map(|t| cwd.join(trim_separators(t.trim())))
            .unwrap_or_else(|| cwd.to_path_buf());
        let executable = non_blank(&self.execute_file)
            .map(|e| target.join(e.trim().trim_start_matches(['/', '\\'])));

        ResolvedSettings {
            source,
            target,
            executable,
            launch_args: self.launch_args.clone().unwrap_or_default(),
        }
    }
}

/// Candidate settings files in lookup order.
pub fn default_locations() -> Vec<Utf8PathBuf> {
    let mut out = Vec::new();

    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe
            .parent()
            .and_then(|p| Utf8PathBuf::from_path_buf(p.to_path_buf()).ok())
        {
            out.push(dir.join(SETTINGS_FILE_NAME));
        }
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "stager", "stager") {
        if let Ok(dir) = Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()) {
            out.push(dir.join(SETTINGS_FILE_NAME));
        }
    }

    out
}
