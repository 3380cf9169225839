use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graceful_echo::config::ServiceConfig;
use graceful_echo::lifecycle::{launch, OsSignals, StartupError};

#[derive(Parser)]
#[command(name = "graceful-echo", version)]
#[command(about = "TCP echo server with an HTTP health endpoint and graceful shutdown")]
#[command(long_about = None)]
struct Cli {
    /// Port for the HTTP health endpoint (/ping, /readyz)
    http_port: u16,

    /// Port for the TCP echo listener
    echo_port: u16,

    /// Anything after the two ports is accepted and ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    _rest: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // Usage goes to stdout with status 1, not clap's stderr/2.
            println!("{}", e.render());
            return ExitCode::from(1);
        }
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graceful_echo=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("graceful-echo v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::from_ports(cli.http_port, cli.echo_port);

    let signals = match OsSignals::register() {
        Ok(signals) => signals,
        Err(e) => {
            let e = StartupError::Signals(e);
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::from(1);
        }
    };

    let services = match launch(&config, signals).await {
        Ok(services) => services,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::from(1);
        }
    };

    match services.wait().await {
        Ok(report) => {
            tracing::info!(
                signals_received = report.signals_received,
                grace_elapsed = ?report.grace_elapsed(),
                "Shutdown complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Service failed");
            ExitCode::from(1)
        }
    }
}
