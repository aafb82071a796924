use crate::{padded_range, ChartError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};
use std::error::Error;
use std::path::Path;
use wqt_model::OlsFit;

/// Render the standard residual diagnostic panel for a fitted model:
/// residuals vs fitted, normal Q-Q, scale-location, and residuals vs
/// leverage, as a single 2x2 PNG.
pub fn diagnostic_panel(fit: &OlsFit, path: &Path) -> Result<()> {
    if fit.residuals.is_empty() {
        return Err(ChartError::NoData(fit.spec.name.clone()));
    }
    draw(fit, path).map_err(|e| ChartError::Draw(e.to_string()))?;
    log::info!("Wrote diagnostics for '{}' to {}", fit.spec.name, path.display());
    Ok(())
}

fn draw(fit: &OlsFit, path: &Path) -> std::result::Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 2));

    let std_resid = fit.standardized_residuals();

    // residuals vs fitted
    let points: Vec<(f64, f64)> = fit
        .fitted
        .iter()
        .zip(&fit.residuals)
        .map(|(x, y)| (*x, *y))
        .collect();
    let (x0, x1) = padded_range(points.iter().map(|p| p.0));
    scatter_panel(
        &panels[0],
        "Residuals vs Fitted",
        "Fitted values",
        "Residuals",
        &points,
        Some([(x0, 0.0), (x1, 0.0)]),
    )?;

    // normal Q-Q
    let normal = Normal::new(0.0, 1.0)?;
    let mut sorted = std_resid.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let points: Vec<(f64, f64)> = sorted
        .iter()
        .enumerate()
        .map(|(i, r)| (normal.inverse_cdf((i as f64 + 0.5) / n as f64), *r))
        .collect();
    let (q0, q1) = padded_range(points.iter().map(|p| p.0));
    scatter_panel(
        &panels[1],
        "Normal Q-Q",
        "Theoretical quantiles",
        "Standardized residuals",
        &points,
        Some([(q0, q0), (q1, q1)]),
    )?;

    // scale-location
    let points: Vec<(f64, f64)> = fit
        .fitted
        .iter()
        .zip(&std_resid)
        .map(|(x, r)| (*x, r.abs().sqrt()))
        .collect();
    scatter_panel(
        &panels[2],
        "Scale-Location",
        "Fitted values",
        "sqrt(|standardized residuals|)",
        &points,
        None,
    )?;

    // residuals vs leverage
    let points: Vec<(f64, f64)> = fit
        .leverage
        .iter()
        .zip(&std_resid)
        .map(|(h, r)| (*h, *r))
        .collect();
    let (h0, h1) = padded_range(points.iter().map(|p| p.0));
    scatter_panel(
        &panels[3],
        "Residuals vs Leverage",
        "Leverage",
        "Standardized residuals",
        &points,
        Some([(h0, 0.0), (h1, 0.0)]),
    )?;

    root.present()?;
    Ok(())
}

fn scatter_panel(
    area: &DrawingArea<BitMapBackend, Shift>,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(f64, f64)],
    reference: Option<[(f64, f64); 2]>,
) -> std::result::Result<(), Box<dyn Error>> {
    let (x_min, x_max) = padded_range(points.iter().map(|p| p.0));
    let (y_min, y_max) = padded_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(45)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(8)
        .y_labels(8)
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 3, BLUE.mix(0.5).filled())),
    )?;
    if let Some([start, end]) = reference {
        chart.draw_series(LineSeries::new(vec![start, end], RED.stroke_width(1)))?;
    }
    Ok(())
}
