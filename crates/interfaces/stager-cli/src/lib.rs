pub mod commands;
pub mod progress;

use clap::ValueEnum;
use stager_infra::SidecarPolicy;

#[derive(ValueEnum, Clone, Debug, Copy, Default, PartialEq, Eq)]
pub enum CliSidecarPolicy {
    /// Use an existing `.md5` sidecar as the file's hash
    #[default]
    Trust,
    /// Use a sidecar only when it is at least as new as the file
    Verify,
    /// Always hash file contents
    Ignore,
}

impl From<CliSidecarPolicy> for SidecarPolicy {
    fn from(p: CliSidecarPolicy) -> Self {
        match p {
            CliSidecarPolicy::Trust => SidecarPolicy::Trust,
            CliSidecarPolicy::Verify => SidecarPolicy::VerifyFreshness,
            CliSidecarPolicy::Ignore => SidecarPolicy::Ignore,
        }
    }
}
