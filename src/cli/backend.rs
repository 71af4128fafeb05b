use anyhow::Result;

#[derive(Debug, Clone, clap::Subcommand)]
pub enum BackendCommands {
    /// Start the HTTP server with the web UI
    Serve,
    /// Check backend configuration for errors and unused options
    CheckConfig,
}

pub async fn handle_backend_command(cmd: BackendCommands) -> Result<()> {
    match cmd {
            BackendCommands::Serve => {
            let settings = crate::server::settings::Settings::new()?;
            crate::server::run_server(settings).await
        }
            BackendCommands::CheckConfig => {
            println!("Checking backend configuration...");
            match crate::server::settings::Settings::new() {
                Ok(settings) => {
                    super::output::success("Configuration is valid");
                    println!(
                        "  Listening on:        {}:{}",
                        settings.server.host, settings.server.port
                    );
                    println!(
                        "  Candidate locations: {}",
                        settings.registry.candidate_locations.join(", ")
                    );
                    println!(
                        "  Probe locations:     {}",
                        settings.validation.probe_locations.join(", ")
                    );
                    Ok(())
                }
                Err(e) => {
                    super::output::failure(format!("Configuration error: {}", e));
                    std::process::exit(1);
                }
            }
        }
    }
}
