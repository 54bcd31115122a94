use super::*;
#[derive(Parser)]
#[command(author, version, about = "Keep a directory of git repositories in sync with their upstreams")]
pub(super) struct Cli {
    #[arg(long, global = true, env = "REPOSYNC_CONFIG", help = "Config file path")]
    pub(super) config: Option<PathBuf>,
    #[arg(long, short, global = true, help = "Enable debug logging on stderr")]
    pub(super) verbose: bool,
    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(clap::Subcommand)]
pub(super) enum Commands {
    #[command(about = "Push, pull or skip every repository under the base directory")]
    Sync(SyncArgs),
    #[command(about = "Show what sync would do without pushing or pulling")]
    Status(StatusArgs),
    #[command(about = "List discovered repositories")]
    List(ListArgs),
    #[command(about = "Manage config")]
    Config(ConfigArgs),
}

#[derive(clap::Args, Clone)]
pub(super) struct BaseDirArgs {
    #[arg(
        long,
        env = "REPOSYNC_BASE_DIR",
        help = "Directory whose immediate subdirectories are repositories"
    )]
    pub(super) base_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub(super) struct SyncArgs {
    #[command(flatten)]
    pub(super) target: BaseDirArgs,
    #[arg(long, help = "Worker threads (defaults to config, then 1)")]
    pub(super) jobs: Option<usize>,
    #[arg(long, help = "Inspect and classify only; never push or pull")]
    pub(super) dry_run: bool,
    #[arg(long, help = "Print the report as JSON")]
    pub(super) json: bool,
    #[arg(long, help = "Suppress per-repository progress lines")]
    pub(super) quiet: bool,
    #[arg(long, help = "Record one audit entry per repository")]
    pub(super) audit_repo: bool,
}

#[derive(Parser)]
pub(super) struct StatusArgs {
    #[command(flatten)]
    pub(super) target: BaseDirArgs,
    #[arg(long, help = "Worker threads (defaults to config, then 1)")]
    pub(super) jobs: Option<usize>,
    #[arg(long, help = "Print the report as JSON")]
    pub(super) json: bool,
}

#[derive(Parser)]
pub(super) struct ListArgs {
    #[command(flatten)]
    pub(super) target: BaseDirArgs,
}

#[derive(Parser)]
pub(super) struct ConfigArgs {
    #[command(subcommand)]
    pub(super) command: ConfigCommands,
}

#[derive(clap::Subcommand)]
pub(super) enum ConfigCommands {
    #[command(about = "Initialize config with a base directory")]
    Init(InitArgs),
    #[command(about = "Print the current config")]
    Show,
}

#[derive(Parser)]
pub(super) struct InitArgs {
    #[arg(long, help = "Directory whose immediate subdirectories are repositories")]
    pub(super) base_dir: PathBuf,
    #[arg(long, help = "Default worker threads for sync and status")]
    pub(super) jobs: Option<usize>,
}
