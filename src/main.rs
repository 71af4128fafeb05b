use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod format;
mod hub;
mod registry;
mod transfer;

#[cfg(feature = "cli")]
mod cli;

#[cfg(feature = "backend")]
mod server;

use cli::{account, hub::HubCommands, menu, registry as listing, transfer::TransferArgs};
use transfer::TransferRequest;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Service account key file (defaults to $ARTIFACT_BROWSER_CREDENTIALS,
    /// then ~/.config/artifact-browser/service-account.json)
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the project and service account of the key
    Account,
    /// Check the key against Artifact Registry
    Validate,
    /// List repositories across candidate locations
    #[command(visible_alias = "repositories")]
    Repos {
        /// Locations to scan instead of the default candidates
        #[arg(long, value_delimiter = ',')]
        locations: Vec<String>,
    },
    /// List packages in a repository
    Packages {
        #[arg(long, short = 'l')]
        location: String,
        #[arg(long, short = 'r')]
        repository: String,
    },
    /// List versions of a package
    Versions {
        #[arg(long, short = 'l')]
        location: String,
        #[arg(long, short = 'r')]
        repository: String,
        #[arg(long, short = 'p')]
        package: String,
    },
    /// List Docker images in a repository
    Images {
        #[arg(long, short = 'l')]
        location: String,
        #[arg(long, short = 'r')]
        repository: String,
    },
    /// Docker Hub commands
    #[command(subcommand)]
    Hub(HubCommands),
    /// Print the commands that copy a Docker Hub image into Artifact Registry
    Transfer(TransferArgs),
    /// Interactive menu
    Menu,
    #[cfg(feature = "backend")]
    #[command(flatten)]
    Backend(cli::backend::BackendCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Backend commands read their settings from config files, not the key file
    #[cfg(feature = "backend")]
    if let Commands::Backend(backend_cmd) = &cli.command {
        return cli::backend::handle_backend_command(backend_cmd.clone()).await;
    }

    let ctx = cli::CliContext::new(cli.credentials.clone())?;

    // Key file errors propagate with `?` and end the process before any
    // command runs; command failures are reported as a failure line.
    let outcome = match &cli.command {
        Commands::Account => {
            let bundle = ctx.load_credentials()?;
            account::show_account(&bundle);
            Ok(())
        }
        Commands::Validate => {
            let bundle = ctx.load_credentials()?;
            if !account::validate(&ctx, &bundle).await {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Repos { locations } => {
            let session = ctx.session()?;
            let locations = if locations.is_empty() {
                &ctx.locations
            } else {
                locations
            };
            listing::list_repositories(&session, locations).await
        }
        Commands::Packages {
            location,
            repository,
        } => {
            let session = ctx.session()?;
            listing::list_packages(&session, location, repository).await
        }
        Commands::Versions {
            location,
            repository,
            package,
        } => {
            let session = ctx.session()?;
            listing::list_versions(&session, location, repository, package).await
        }
        Commands::Images {
            location,
            repository,
        } => {
            let session = ctx.session()?;
            listing::list_images(&session, location, repository).await
        }
        Commands::Hub(hub_cmd) => cli::hub::handle_hub_command(&ctx.hub, hub_cmd).await,
        Commands::Transfer(args) => {
            let bundle = ctx.load_credentials()?;
            cli::transfer::handle_transfer(&bundle, &TransferRequest::from(args), args.script)
        }
        Commands::Menu => {
            let session = ctx.session()?;
            account::show_account(&session.bundle);
            menu::run_menu(&ctx, &session, &mut menu::StdinPrompter).await
        }
        #[cfg(feature = "backend")]
        Commands::Backend(_) => {
            unreachable!("Backend commands should have been handled earlier")
        }
    };

    if !report(outcome) {
        std::process::exit(1);
    }

    Ok(())
}

/// Print a failed command as a failure line. Returns whether it succeeded.
fn report(outcome: Result<()>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            cli::output::failure(format!("{:#}", e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_credentials_flag() {
        let cli = Cli::parse_from([
            "artifact-browser",
            "packages",
            "-l",
            "us-central1",
            "-r",
            "my-repo",
            "--credentials",
            "/tmp/key.json",
        ]);
        assert_eq!(cli.credentials, Some(PathBuf::from("/tmp/key.json")));
        assert!(matches!(cli.command, Commands::Packages { .. }));
    }

    #[test]
    fn test_report_flags_failed_commands() {
        assert!(report(Ok(())));
        assert!(!report(Err(anyhow::anyhow!("Failed to list packages")
            .context("in us-central1/my-repo"))));
    }

    #[test]
    fn test_repos_locations_are_comma_separated() {
        let cli = Cli::parse_from(["artifact-browser", "repos", "--locations", "us,europe-west1"]);
        match cli.command {
            Commands::Repos { locations } => assert_eq!(locations, vec!["us", "europe-west1"]),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
