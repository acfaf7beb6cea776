//! Merged window timeline: table to stdout or CSV export.

use crf_data::service::FlowService;
use crf_utils::dates::{format_day, format_instant};
use crf_wsc::source::WscClient;
use crf_wsc::station::StationId;
use crf_wsc::window::TimeWindow;
use log::info;

/// Fetch the merged timeline for a window and print or export it.
pub async fn run_timeline(
    id: &str,
    days: u32,
    year: Option<i32>,
    csv: Option<&str>,
) -> anyhow::Result<()> {
    let station = StationId::new(id)?;
    let window = match year {
        Some(y) => TimeWindow::calendar_year(station, y),
        None => TimeWindow::last_days(station, days),
    };

    let service = FlowService::new(WscClient::new());
    let snapshot = service.fetch_snapshot(&window).await;
    let timeline = snapshot.chart.map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("{} samples for {}", timeline.len(), window.station);

    if let Some(path) = csv {
        let mut rows: Vec<String> = Vec::with_capacity(timeline.len() + 1);
        rows.push("timestamp,discharge,level,source".to_string());
        for sample in timeline.iter() {
            rows.push(format!(
                "{},{},{},{}",
                sample.timestamp.to_rfc3339(),
                sample
                    .discharge
                    .map_or(String::new(), |v| format!("{:.2}", v)),
                sample.level.map_or(String::new(), |v| format!("{:.3}", v)),
                sample.source
            ));
        }
        std::fs::write(path, rows.join("\n"))?;
        println!("{} samples written to {}", timeline.len(), path);
    } else {
        for sample in timeline.iter() {
            println!(
                "{}  {:>10}  {:>8}  {}",
                format_instant(&sample.timestamp),
                sample
                    .discharge
                    .map_or(String::new(), |v| format!("{:.2}", v)),
                sample.level.map_or(String::new(), |v| format!("{:.3}", v)),
                sample.source
            );
        }
    }

    if let Some(gap) = snapshot.gap {
        println!(
            "Note: no data for {} days ({} to {}) while the archive catches up",
            gap.days,
            format_day(&gap.start),
            format_day(&gap.end)
        );
    }
    Ok(())
}
