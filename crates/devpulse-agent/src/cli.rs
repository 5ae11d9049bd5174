//! CLI argument definitions for the devpulse agent.
//!
//! The agent is a daemon rather than a command suite: it loads a source
//! list, harvests on a fixed interval, and serves metrics until stopped.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | `devpulse.json` | Source list and credentials file |
//! | `--db` | `devpulse.duckdb` | DuckDB warehouse path |
//! | `--listen` | `0.0.0.0:8080` | Metrics/liveness listen address |
//! | `--interval-hours` | `24` | Hours between harvest cycles |
//! | `--once` | `false` | Run a single cycle and exit |

use std::path::PathBuf;

use clap::Parser;

/// Windowed ingestion poller for GitHub issues and Stack Overflow Q&A.
#[derive(Debug, Parser)]
#[command(name = "devpulse", version, about)]
pub struct Cli {
    /// Path to the JSON file listing repositories and tags to harvest.
    #[arg(long, default_value = "devpulse.json")]
    pub config: PathBuf,

    /// Path of the DuckDB warehouse file.
    #[arg(long, default_value = "devpulse.duckdb")]
    pub db: PathBuf,

    /// Address the liveness and metrics endpoints listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Hours to wait between harvest cycles.
    #[arg(long, default_value_t = 24)]
    pub interval_hours: u64,

    /// Run one harvest cycle and exit instead of looping.
    #[arg(long)]
    pub once: bool,
}
