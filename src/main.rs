use clap::Parser;
use tracing_subscriber::EnvFilter;
use windy_plugin_compiler::cli::Cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if !cli.has_task() {
        if let Err(e) = Cli::write_help(&mut std::io::stdout()) {
            tracing::error!(error = %e, "Failed to print help");
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = cli.run().await {
        // Terminal bell so a failure in a background terminal gets noticed
        tracing::error!("{e:#}\u{7}");
        std::process::exit(1);
    }
}
