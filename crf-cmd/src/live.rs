//! Current conditions for a station.

use crf_utils::dates::format_instant;
use crf_wsc::source::{HydrometricSource, WscClient};
use crf_wsc::station::StationId;
use log::info;

/// Fetch and print the freshest available reading.
pub async fn run_live(id: &str) -> anyhow::Result<()> {
    let station = StationId::new(id)?;
    let client = WscClient::new();

    info!("Fetching current conditions for {}", station);
    let sample = client.latest(&station).await?;

    println!("Station:   {}", station);
    println!("Observed:  {}", format_instant(&sample.timestamp));
    match sample.discharge {
        Some(discharge) => println!("Discharge: {:.2} m³/s", discharge),
        None => println!("Discharge: no data"),
    }
    match sample.level {
        Some(level) => println!("Level:     {:.3} m", level),
        None => println!("Level:     no data"),
    }
    Ok(())
}
