//! Command implementations for the CRF CLI.
//!
//! Provides subcommands for probing WSC stations and pulling current
//! conditions, merged discharge timelines and flow statistics.

use clap::Subcommand;

pub mod live;
pub mod station;
pub mod stats;
pub mod timeline;

#[derive(Subcommand)]
pub enum Command {
    /// Validate a station id and show where its data comes from
    Station {
        /// WSC station number, e.g. 08NA011
        id: String,
    },

    /// Current conditions for a station (freshest available reading)
    Live {
        /// WSC station number, e.g. 08NA011
        id: String,
    },

    /// Merged discharge timeline over a window
    Timeline {
        /// WSC station number, e.g. 08NA011
        id: String,

        /// Trailing window length in days
        #[arg(short, long, default_value_t = 7, conflicts_with = "year")]
        days: u32,

        /// One past calendar year instead of a trailing window
        #[arg(short, long)]
        year: Option<i32>,

        /// Write the timeline to this path as CSV instead of stdout
        #[arg(long)]
        csv: Option<String>,
    },

    /// Statistics block and trend line over a window
    Stats {
        /// WSC station number, e.g. 08NA011
        id: String,

        /// Trailing window length in days
        #[arg(short, long, default_value_t = 30, conflicts_with = "year")]
        days: u32,

        /// One past calendar year instead of a trailing window
        #[arg(short, long)]
        year: Option<i32>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Station { id } => station::run_station(&id),
        Command::Live { id } => live::run_live(&id).await,
        Command::Timeline {
            id,
            days,
            year,
            csv,
        } => timeline::run_timeline(&id, days, year, csv.as_deref()).await,
        Command::Stats { id, days, year } => stats::run_stats(&id, days, year).await,
    }
}
