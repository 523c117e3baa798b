mod commands;

use clap::{Parser, Subcommand};
use commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE};
use solera_core::{install_signal_handler, Engine, Role};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "solera",
    version,
    about = "Wine prefix supervisor and DXVK manager for running Roblox on Linux"
)]
struct Cli {
    /// Path to the solera data directory.
    #[arg(long, default_value = "~/.local/share/solera")]
    data: String,

    /// Path to the configuration file.
    #[arg(long, default_value = "~/.config/solera/config.toml")]
    config: String,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Delete the entire data directory: prefix, cache, deployments, state.
    Delete,
    /// Manage the DXVK patch set inside the prefix.
    #[command(subcommand)]
    Dxvk(DxvkCommand),
    /// Open the configuration file in $EDITOR.
    Edit,
    /// Run a command inside the prefix with Wine.
    Exec {
        /// Command and arguments to pass to wine (after --).
        #[arg(required = true, last = true)]
        args: Vec<String>,
    },
    /// Kill every process associated with the prefix.
    Kill,
    /// Launch the Roblox player and supervise its session.
    Player {
        /// Arguments forwarded verbatim to the launcher.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Launch Roblox Studio and supervise its session.
    Studio {
        /// Arguments forwarded verbatim to the launcher.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Delete and recreate the prefix and logs directories.
    Reset,
}

#[derive(Debug, Subcommand)]
enum DxvkCommand {
    /// Fetch, extract, and activate the configured DXVK version.
    Install,
    /// Remove the DXVK DLLs and restore the built-in implementations.
    Uninstall,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    install_signal_handler();

    let data = expand_tilde(&cli.data);
    let config_path = expand_tilde(&cli.config);

    let engine = match Engine::new(&data, &config_path) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let result = match cli.command {
        Commands::Delete => commands::delete::run(&engine),
        Commands::Dxvk(DxvkCommand::Install) => {
            commands::run_action(&engine, solera_core::Action::InstallDxvk)
        }
        Commands::Dxvk(DxvkCommand::Uninstall) => {
            commands::run_action(&engine, solera_core::Action::UninstallDxvk)
        }
        Commands::Edit => commands::edit::run(&config_path),
        Commands::Exec { args } => commands::exec::run(&engine, &args),
        Commands::Kill => commands::run_action(&engine, solera_core::Action::KillPrefix),
        Commands::Player { args } => commands::launch::run(&engine, Role::Player, &args),
        Commands::Studio { args } => commands::launch::run(&engine, Role::Studio, &args),
        Commands::Reset => commands::reset::run(&engine),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.contains("failed to parse config") {
                EXIT_CONFIG_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
