mod cli;
mod error;

use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hgscrape_config::Settings;
use hgscrape_core::{MemorySink, Poller, PrometheusSink, RouterSource};

use crate::cli::{Cli, LogFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let path = cli.config.unwrap_or_else(hgscrape_config::config_path);
    tracing::debug!(path = %path.display(), "loading configuration");

    let settings = hgscrape_config::load_settings(&path)?;

    if cli.once {
        poll_once(settings).await
    } else {
        serve(settings).await
    }
}

/// Single tick into an in-memory sink; counters go to stdout.
async fn poll_once(settings: Settings) -> Result<(), CliError> {
    let exporter = settings.exporter;
    let sink = MemorySink::new(exporter.metric_prefix);
    let mut poller = Poller::new(RouterSource::new(exporter.router), sink, exporter.wan_multiplier);

    let report = poller.tick().await?;
    info!(
        published = report.published,
        suppressed = report.suppressed,
        parse_failures = report.parse_failures,
        "poll complete"
    );

    print!("{}", poller.sink().render());
    Ok(())
}

/// Install the metrics endpoint and poll until Ctrl-C or SIGTERM.
async fn serve(settings: Settings) -> Result<(), CliError> {
    let listen = settings.listen;
    let exporter = settings.exporter;

    PrometheusBuilder::new()
        .with_http_listener(listen)
        .install()
        .map_err(|e| CliError::Exporter {
            addr: listen,
            reason: e.to_string(),
        })?;

    let sink = PrometheusSink::register(&exporter.metric_prefix);
    info!(
        %listen,
        router = %exporter.router.url,
        wan_multiplier = exporter.wan_multiplier,
        "serving metrics"
    );

    let poller = Poller::new(RouterSource::new(exporter.router), sink, exporter.wan_multiplier);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(poller.run(exporter.poll_interval, cancel.clone()));

    shutdown_signal().await;
    info!("shutdown requested");
    cancel.cancel();

    task.await.map_err(|e| CliError::Internal(e.to_string()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
