use super::*;
use reposync_core::audit::AuditStatus;

pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let audit = AuditLogger::new()?;
    info!(command = command_label(&cli.command), "Running command");

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => default_config_path()?,
    };

    let result = match cli.command {
        Commands::Sync(args) => handle_sync(args, &config_path, &audit),
        Commands::Status(args) => handle_status(args, &config_path, &audit),
        Commands::List(args) => handle_list(args, &config_path),
        Commands::Config(args) => handle_config(args, &config_path, &audit),
    };

    if let Err(err) = &result {
        let _ = audit.record(
            "app.error",
            AuditStatus::Failed,
            None,
            None,
            Some(&err.to_string()),
        );
    }

    result
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub(super) fn command_label(command: &Commands) -> &'static str {
    match command {
        Commands::Sync(_) => "sync",
        Commands::Status(_) => "status",
        Commands::List(_) => "list",
        Commands::Config(_) => "config",
    }
}
