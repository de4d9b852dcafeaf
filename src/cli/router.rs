//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::*;
use crate::config::{ConfigOverrides, PolarionConfig};
use crate::error::AppResult;

/// Execute a CLI command with the already loaded configuration
pub async fn execute_command(command: Option<Commands>, config: PolarionConfig) -> AppResult<()> {
    match command {
        Some(Commands::Analyze {
            url,
            project,
            username,
            timeout,
        }) => {
            let overrides = ConfigOverrides {
                server_url: url,
                fetch_project_id: project,
                username,
                timeout_secs: timeout,
            };
            run_analyze(config, overrides).await
        }
        Some(Commands::Check) => run_check(&config),
        Some(Commands::Show { json }) => run_show(&config, json),
        Some(Commands::Metrics { json }) => run_metrics(json),
        // Analyze is the default
        None => run_analyze(config, ConfigOverrides::default()).await,
    }
}
