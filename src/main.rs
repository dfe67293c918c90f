//! sync-overlays CLI entry point

use std::fmt::Write as _;
use std::process::ExitCode;

use clap::Parser;

use sync_overlays::cli::{Cli, Commands};
use sync_overlays::{OverlayError, StatusChannelClient, REGISTERED_CLASSES};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "sync_overlays=debug"
    } else {
        "sync_overlays=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run(cli: &Cli) -> sync_overlays::Result<String> {
    let mut out = String::new();

    match &cli.command {
        Commands::Status { path } => {
            let Some(path) = path.to_str() else {
                return Err(OverlayError::InvalidPath {
                    path: path.display().to_string(),
                });
            };

            let client = StatusChannelClient::new(cli.channel_config());
            let watched = client.watched_directories();

            if watched.is_empty() {
                writeln!(out, "{}: not applicable (no watched directories)", path).unwrap();
            } else if !watched.contains(path) {
                writeln!(out, "{}: not applicable (outside watched directories)", path).unwrap();
            } else {
                match client.state_of(path) {
                    Some(category) => writeln!(out, "{}: {}", path, category).unwrap(),
                    None => writeln!(out, "{}: not applicable (untracked)", path).unwrap(),
                }
            }
        }

        Commands::Watched => {
            let client = StatusChannelClient::new(cli.channel_config());
            let watched = client.watched_directories();

            if watched.is_empty() {
                writeln!(out, "No watched directories (daemon unreachable or idle)").unwrap();
            } else {
                for dir in watched.directories() {
                    writeln!(out, "{}", dir).unwrap();
                }
            }
        }

        Commands::Categories => {
            writeln!(out, "{:<10}  {:>8}  {}", "category", "priority", "class id").unwrap();
            for (class_id, category) in REGISTERED_CLASSES {
                writeln!(
                    out,
                    "{:<10}  {:>8}  {}",
                    category.as_str(),
                    category.priority(),
                    class_id
                )
                .unwrap();
            }
        }
    }

    Ok(out)
}
