//! Clap derive structures for the `hgscrape` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// hgscrape -- Prometheus exporter for HG8247X6 router traffic counters
#[derive(Debug, Parser)]
#[command(
    name = "hgscrape",
    version,
    about = "Export router traffic counters to Prometheus",
    long_about = "Logs into a Huawei HG8247X6 router's web interface on a fixed cadence,\n\
        scrapes WAN, LAN and WiFi byte counters, and serves them as monotonic\n\
        Prometheus counters.\n\n\
        Router settings come from the config file and from environment variables\n\
        (ROUTER_HOST, ROUTER_USERNAME, ROUTER_PASSWORD, ...)."
)]
pub struct Cli {
    /// Config file path (defaults to the platform config directory)
    #[arg(long, short = 'c', env = "HGSCRAPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, env = "HGSCRAPE_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Poll the router once, print the counters and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}
