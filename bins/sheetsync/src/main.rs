mod cmd;

use clap::Parser;
use cmd::config::{Effective, ExportArgs};

#[derive(Parser)]
#[command(
    name = "sheetsync",
    version,
    about = "Append recent database records to a Google Sheets worksheet"
)]
struct Cli {
    #[command(flatten)]
    args: ExportArgs,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let eff = match Effective::new(&cli.args) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = cmd::export::run(&eff).await {
        tracing::error!(error = %e, "export failed");
        std::process::exit(1);
    }
}
