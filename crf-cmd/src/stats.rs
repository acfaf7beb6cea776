//! Statistics block and trend line for a window.

use crf_data::service::FlowService;
use crf_data::trend::DEFAULT_RECENT_DAYS;
use crf_utils::dates::format_instant;
use crf_wsc::source::WscClient;
use crf_wsc::station::StationId;
use crf_wsc::window::TimeWindow;

/// Fetch a window and print its discharge statistics and trend.
pub async fn run_stats(id: &str, days: u32, year: Option<i32>) -> anyhow::Result<()> {
    let station = StationId::new(id)?;
    let window = match year {
        Some(y) => TimeWindow::calendar_year(station, y),
        None => TimeWindow::last_days(station, days),
    };

    let service = FlowService::new(WscClient::new());
    let snapshot = service.fetch_snapshot(&window).await;
    let stats = snapshot.statistics.map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("Samples:   {}", stats.count);
    println!(
        "Span:      {} to {}",
        format_instant(&stats.start),
        format_instant(&stats.end)
    );
    println!("Average:   {:.2} m³/s", stats.average);
    println!("Median:    {:.2} m³/s", stats.median);
    println!("Minimum:   {:.2} m³/s", stats.minimum);
    println!("Maximum:   {:.2} m³/s", stats.maximum);
    println!("Quartiles: {:.2} / {:.2} m³/s", stats.p25, stats.p75);

    match snapshot.trend {
        Ok(trend) => println!(
            "Trend:     {} ({:+.2} % over the last {} days)",
            trend.direction, trend.percent_change, DEFAULT_RECENT_DAYS
        ),
        Err(e) => println!("Trend:     unavailable ({})", e),
    }
    Ok(())
}
