//! Full trend-analysis pipeline: load, select, clean, fit, report.

use crate::PolicyArgs;
use log::{error, info, warn};
use std::path::Path;
use wqt_data::{core_months, trend_stations, TrendDataset};
use wqt_model::{
    backward_aic, fit, nested_f_test, sequential_anova, station_slopes, summary, ModelSpec, OlsFit,
};
use wqt_sample::{sample::SampleRecord, station::StationNames};

/// Run the full trend analysis.
///
/// The model sequence honors the dependency structure: the stepwise
/// reduction needs the saturated fit, the curvature comparison needs
/// the reduced fit, and the per-station model depends on neither. A
/// failed fit is logged and its dependents skipped; independent models
/// still run.
pub fn run_trends(
    samples_csv: &str,
    stations_xlsx: &str,
    out_dir: &str,
    skip_charts: bool,
    policy: &PolicyArgs,
) -> anyhow::Result<()> {
    let records = SampleRecord::load_csv(Path::new(samples_csv))?;
    info!("Loaded {} sample records from {}", records.len(), samples_csv);
    let names = StationNames::load_xlsx(Path::new(stations_xlsx))?;
    info!("Loaded {} station names from {}", names.len(), stations_xlsx);

    let trend_set = trend_stations(&records, &policy.selection())?;
    let dataset = TrendDataset::build(&records, &trend_set, &names, &policy.transform())?;
    let core = core_months(&dataset)?;
    info!(
        "Core-months dataset: {} of {} rows",
        core.rows.len(),
        dataset.rows.len()
    );

    // Model 1: saturated two-way; establishes whether station trends differ
    let saturated = match fit(&core, &ModelSpec::saturated_two_way()) {
        Ok(model) => {
            match sequential_anova(&core, &model) {
                Ok(table) => println!("{table}"),
                Err(e) => error!("Saturated-model ANOVA failed: {e}"),
            }
            Some(model)
        }
        Err(e) => {
            error!("Saturated model failed: {e}");
            None
        }
    };

    // Model 2: stepwise reduction; the primary numeric report
    let reduced = match &saturated {
        Some(model) => match backward_aic(&core, &model.spec) {
            Ok(result) => {
                if result.trace.is_empty() {
                    println!("Stepwise reduction dropped no terms\n");
                } else {
                    println!("Stepwise reduction:");
                    for step in &result.trace {
                        println!(
                            "  - {} (AIC {:.2} -> {:.2})",
                            step.dropped, step.aic_before, step.aic_after
                        );
                    }
                    println!();
                }
                match sequential_anova(&core, &result.fit) {
                    Ok(table) => println!("{table}"),
                    Err(e) => error!("Reduced-model ANOVA failed: {e}"),
                }
                println!("{}", summary::coefficient_table(&result.fit));
                Some(result.fit)
            }
            Err(e) => {
                error!("Stepwise reduction failed: {e}");
                None
            }
        },
        None => {
            warn!("Skipping stepwise reduction; saturated model unavailable");
            None
        }
    };

    // Model 3: curvature check against the reduced model
    match fit(&core, &ModelSpec::polynomial_check()) {
        Ok(polynomial) => match &reduced {
            Some(reduced_fit) => match nested_f_test(reduced_fit, &polynomial) {
                Ok(test) => println!(
                    "Curvature check: F({}, {}) = {:.3}, p = {}  [{} vs {}]\n",
                    test.df_num,
                    test.df_den,
                    test.f_value,
                    wqt_utils::fmt::format_p(test.p_value),
                    test.reduced_formula,
                    test.full_formula
                ),
                Err(e) => error!("Curvature comparison failed: {e}"),
            },
            None => warn!("Skipping curvature comparison; reduced model unavailable"),
        },
        Err(e) => error!("Polynomial model failed: {e}"),
    }

    // Final model: one slope per station; the deliverable
    match fit(&core, &ModelSpec::per_station_trend()) {
        Ok(final_fit) => {
            let slopes = station_slopes(&final_fit);
            let label_for = |id: &str| {
                core.rows
                    .iter()
                    .find(|r| r.station_id == id)
                    .map(|r| r.label().to_string())
                    .unwrap_or_else(|| id.to_string())
            };
            println!("Per-station TN trends (core months, log scale):");
            println!("{}", summary::slope_table(&slopes, &label_for));
            let significant = slopes.iter().filter(|s| s.is_significant()).count();
            println!(
                "{} of {} stations show a significant trend (p < 0.05)\n",
                significant,
                slopes.len()
            );

            write_outputs(&core, &slopes, &reduced, &final_fit, out_dir, skip_charts)?;
        }
        Err(e) => error!("Per-station trend model failed: {e}"),
    }

    Ok(())
}

fn write_outputs(
    core: &TrendDataset,
    slopes: &[wqt_model::StationSlope],
    reduced: &Option<OlsFit>,
    final_fit: &OlsFit,
    out_dir: &str,
    skip_charts: bool,
) -> anyhow::Result<()> {
    let out = Path::new(out_dir);
    std::fs::create_dir_all(out)?;

    let slopes_path = out.join("station_slopes.json");
    let json = serde_json::to_string_pretty(slopes)?;
    std::fs::write(&slopes_path, json)?;
    info!("Wrote slope table to {}", slopes_path.display());

    if skip_charts {
        return Ok(());
    }
    if let Some(reduced_fit) = reduced {
        if let Err(e) =
            wqt_chart::diagnostics::diagnostic_panel(reduced_fit, &out.join("reduced_diagnostics.png"))
        {
            error!("Reduced-model diagnostics failed: {e}");
        }
    }
    if let Err(e) =
        wqt_chart::diagnostics::diagnostic_panel(final_fit, &out.join("final_diagnostics.png"))
    {
        error!("Final-model diagnostics failed: {e}");
    }
    if let Err(e) = wqt_chart::trend::trend_panels(core, slopes, &out.join("station_trends.png")) {
        error!("Trend panels failed: {e}");
    }
    Ok(())
}
