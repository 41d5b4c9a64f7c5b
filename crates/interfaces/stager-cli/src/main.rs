use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use stager_cli::progress::ProgressView;
use stager_cli::{commands, CliSidecarPolicy};
use stager_config::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Settings file (defaults to stager.json next to the binary, then the user config dir)
    #[arg(short, long, global = true, env = "STAGER_CONFIG")]
    config: Option<Utf8PathBuf>,
    #[command(flatten)]
    paths: PathArgs,
    #[command(flatten)]
    launch: LaunchArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct PathArgs {
    /// Folder holding the latest files
    #[arg(long, global = true, env = "STAGER_SOURCE")]
    source: Option<String>,
    /// Installed folder (defaults to the current directory)
    #[arg(long, global = true, env = "STAGER_TARGET")]
    target: Option<String>,
    #[arg(long, global = true, value_enum, default_value_t = CliSidecarPolicy::Trust)]
    sidecars: CliSidecarPolicy,
}

#[derive(Args)]
struct LaunchArgs {
    /// Program to start afterwards, relative to the target folder
    #[arg(long, global = true, env = "STAGER_EXECUTE")]
    execute: Option<String>,
    #[arg(
        long,
        global = true,
        env = "STAGER_LAUNCH_ARGS",
        allow_hyphen_values = true
    )]
    launch_args: Option<String>,
    #[arg(long, global = true)]
    no_launch: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Update the target folder, then start the program (default)
    Run,
    /// List pending changes without applying them
    Check {
        #[arg(long)]
        json: bool,
    },
    /// Print the hash used to compare a file
    Hash { file: Utf8PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Start program");

    let command = cli.command.unwrap_or(Commands::Run);
    let sidecars = cli.paths.sidecars;

    let file = Settings::discover(cli.config.as_deref())?;
    info!("Settings from file: {:?}", file);
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("Current directory is not UTF-8: {}", p.display()))?;
    let settings = file
        .merge(Settings {
            source_dir: cli.paths.source,
            target_dir: cli.paths.target,
            execute_file: cli.launch.execute,
            launch_args: cli.launch.launch_args,
        })
        .resolve(&cwd);

    match command {
        Commands::Run => {
            commands::cmd_run(
                &settings,
                sidecars,
                !cli.launch.no_launch,
                ProgressView::stderr(),
            )
            .await?;
        }
        Commands::Check { json } => {
            commands::cmd_check(&settings, sidecars, json).await?;
        }
        Commands::Hash { file } => {
            commands::cmd_hash(&file, sidecars)?;
        }
    }

    Ok(())
}
