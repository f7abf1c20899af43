use clap::Parser;

/// Drives a distributed Game-of-Life run against a broker and a fleet of
/// workers: loads the initial board, starts the run, polls counts, and
/// writes snapshot images on request.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// Print help information.
    #[arg(long = "help", action = clap::ArgAction::Help)]
    help: Option<bool>,

    /// Number of workers; must match the length of --worker-addresses.
    #[arg(short = 't', long = "workers", default_value_t = 8)]
    pub workers: u32,

    /// Board width.
    #[arg(short = 'w', long = "width", default_value_t = 512)]
    pub width: u32,

    /// Board height.
    #[arg(short = 'h', long = "height", default_value_t = 512)]
    pub height: u32,

    /// Total number of turns to run.
    #[arg(long = "turns", default_value_t = 1000)]
    pub turns: u32,

    /// Broker address, host:port.
    #[arg(long = "broker-address", default_value = "127.0.0.1:5000")]
    pub broker_address: String,

    /// Comma-separated worker addresses, host:port.
    #[arg(long = "worker-addresses", value_delimiter = ',')]
    pub worker_addresses: Vec<String>,

    /// Suppress visualization events; only count/fetch telemetry is logged.
    #[arg(long = "no-vis", default_value_t = false)]
    pub no_vis: bool,

    /// How often to poll Count, in milliseconds.
    #[arg(long = "count-interval-ms", default_value_t = 2000)]
    pub count_interval_ms: u64,

    /// Directory to read the input PGM and write output PGMs from/to.
    #[arg(long = "image-dir", default_value = ".")]
    pub image_dir: String,

    /// Fraction of cells alive when no input PGM is found and a random
    /// board is generated instead.
    #[arg(long = "random-alive-fraction", default_value_t = 0.4)]
    pub random_alive_fraction: f64,
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_addresses.len() != self.workers as usize {
            return Err(format!(
                "--workers={} but {} --worker-addresses given",
                self.workers,
                self.worker_addresses.len()
            ));
        }
        Ok(())
    }
}
