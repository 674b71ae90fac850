//! Global configuration.
//!
//! Every setting comes from the command line; this module turns the global
//! flags into a logger and a worker count.

use clap::{ArgAction, Args};
use env_logger::Env;
use log::LevelFilter;

/// Options accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Number of worker threads for tools that run in parallel [number of CPUs]
    #[arg(long, global = true)]
    pub threads: Option<usize>,
}

impl GlobalOpts {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Worker count, capped at the number of available CPUs.
    pub fn thread_count(&self) -> usize {
        let cpus = num_cpus::get();
        match self.threads {
            Some(0) | None => cpus,
            Some(n) if n > cpus => {
                log::warn!(
                    "Not enough CPUs available. Scaling down to {} threads",
                    cpus
                );
                cpus
            }
            Some(n) => n,
        }
    }

    /// Initializes `env_logger`. `RUST_LOG` takes precedence over the flags.
    pub fn init_logging(&self) {
        let level = self.log_level().to_string().to_lowercase();
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
            .format_timestamp(None)
            .try_init();
    }
}
