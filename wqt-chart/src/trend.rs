use crate::palette::station_color;
use crate::{padded_range, ChartError, Result};
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use wqt_data::TrendDataset;
use wqt_model::StationSlope;

/// Render one log(TN)-vs-year scatter panel per station with the
/// fitted trend line from the per-station model. Panels follow the
/// dataset's station order (ascending median TN).
pub fn trend_panels(data: &TrendDataset, slopes: &[StationSlope], path: &Path) -> Result<()> {
    if data.rows.is_empty() {
        return Err(ChartError::NoData("trend panels".to_string()));
    }
    draw(data, slopes, path).map_err(|e| ChartError::Draw(e.to_string()))?;
    log::info!("Wrote trend panels to {}", path.display());
    Ok(())
}

fn draw(
    data: &TrendDataset,
    slopes: &[StationSlope],
    path: &Path,
) -> std::result::Result<(), Box<dyn Error>> {
    let stations = &data.station_order;
    let cols = (stations.len() as f64).sqrt().ceil() as usize;
    let rows = stations.len().div_ceil(cols);

    // display labels and per-station points
    let mut labels: BTreeMap<&str, &str> = BTreeMap::new();
    let mut points: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for row in &data.rows {
        labels
            .entry(row.station_id.as_str())
            .or_insert_with(|| row.label());
        points
            .entry(row.station_id.as_str())
            .or_default()
            .push((row.year as f64, row.tn.ln()));
    }
    let slope_by_station: BTreeMap<&str, &StationSlope> = slopes
        .iter()
        .map(|s| (s.station_id.as_str(), s))
        .collect();

    let root = BitMapBackend::new(path, (420 * cols as u32, 320 * rows as u32))
        .into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((rows, cols));

    for (idx, station) in stations.iter().enumerate() {
        let station_points = match points.get(station.as_str()) {
            Some(p) => p,
            None => continue,
        };
        let (x_min, x_max) = padded_range(station_points.iter().map(|p| p.0));
        let (y_min, y_max) = padded_range(station_points.iter().map(|p| p.1));
        let color = station_color(idx);

        let caption = match slope_by_station.get(station.as_str()) {
            Some(s) => format!(
                "{} ({:+.4}/yr{})",
                labels[station.as_str()],
                s.slope_per_year,
                if s.is_significant() { " *" } else { "" }
            ),
            None => labels[station.as_str()].to_string(),
        };

        let mut chart = ChartBuilder::on(&panels[idx])
            .caption(caption, ("sans-serif", 16))
            .margin(10)
            .x_label_area_size(25)
            .y_label_area_size(40)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("log TN (mg/L)")
            .x_labels(6)
            .y_labels(6)
            .draw()?;

        chart.draw_series(
            station_points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 3, color.mix(0.6).filled())),
        )?;

        // trend line through the station's centroid with the fitted slope
        if let Some(s) = slope_by_station.get(station.as_str()) {
            let n = station_points.len() as f64;
            let x_bar = station_points.iter().map(|p| p.0).sum::<f64>() / n;
            let y_bar = station_points.iter().map(|p| p.1).sum::<f64>() / n;
            let line = [
                (x_min, y_bar + s.slope_per_year * (x_min - x_bar)),
                (x_max, y_bar + s.slope_per_year * (x_max - x_bar)),
            ];
            chart.draw_series(LineSeries::new(line.to_vec(), color.stroke_width(2)))?;
        }
    }

    root.present()?;
    Ok(())
}
