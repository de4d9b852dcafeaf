use clap::Parser;
use polarion_metrics::cli::{execute_command, get_log_level, Cli};
use polarion_metrics::config::ConfigLoader;
use polarion_metrics::error::PolarionError;
use tracing::{debug, error, trace};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration is read first so its log level can seed the filter.
    let config = match ConfigLoader::new().load(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(e.exit_code());
        }
    };

    let log_level = get_log_level(cli.verbose, config.effective_log_level());
    tracing_subscriber::fmt()
        .with_env_filter(log_level.as_str())
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("polarion-metrics started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
    trace!("Effective configuration: {:?}", config);

    if let Err(e) = execute_command(cli.command, config).await {
        error!("Fatal error: {}", e);
        let exit_code = match e.downcast_ref::<PolarionError>() {
            Some(err) => {
                eprintln!("Error: {}", err.user_message());
                err.exit_code()
            }
            None => {
                eprintln!("Error: {e}");
                1
            }
        };
        std::process::exit(exit_code);
    }
}
