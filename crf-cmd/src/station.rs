//! Station inspection without any network traffic.

use crf_wsc::realtime::datamart_csv_url;
use crf_wsc::station::StationId;

/// Validate a station id and print its normalized form, region code and
/// Datamart CSV location.
pub fn run_station(id: &str) -> anyhow::Result<()> {
    let station = StationId::new(id)?;
    println!("Station:      {}", station);
    println!("Region:       {}", station.region_code());
    println!("Datamart CSV: {}", datamart_csv_url(&station));
    Ok(())
}
