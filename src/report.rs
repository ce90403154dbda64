//! Renders filtered summaries to the console, a CSV file and a plot image.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

use crate::analyzers::types::TokenSummary;
use crate::output::{render_table, write_summaries};
use crate::plot::{PlotOutcome, render_scatter, show};

pub const DEFAULT_CSV_PATH: &str = "trending_analysis.csv";
pub const DEFAULT_PLOT_PATH: &str = "trending_analysis_plot.png";

/// Where each rendering goes. A `None` CSV path leaves the CSV untouched.
/// With `show`, a written plot is opened when a display is available.
#[derive(Debug, Clone)]
pub struct ReportTargets {
    pub csv: Option<PathBuf>,
    pub plot: PathBuf,
    pub show: bool,
}

impl Default for ReportTargets {
    fn default() -> Self {
        Self {
            csv: Some(PathBuf::from(DEFAULT_CSV_PATH)),
            plot: PathBuf::from(DEFAULT_PLOT_PATH),
            show: true,
        }
    }
}

/// Prints the table, writes the CSV and renders the plot.
///
/// Each output is attempted even if an earlier one failed; the first failure
/// is returned once all have run.
pub fn publish(summaries: &[TokenSummary], targets: &ReportTargets) -> Result<()> {
    let mut failures = Vec::new();

    let table = writeln!(std::io::stdout().lock(), "{}", render_table(summaries))
        .context("failed to print table");
    collect(&mut failures, "table", table);

    if let Some(csv_path) = &targets.csv {
        let csv = write_summaries(csv_path, summaries).and_then(|()| {
            writeln!(
                std::io::stdout().lock(),
                "\nSaved aggregated trending tokens to {}.",
                csv_path.display()
            )
            .context("failed to print confirmation")
        });
        collect(&mut failures, "csv", csv);
    }

    let plot = render_scatter(&targets.plot, summaries).and_then(|outcome| match outcome {
        PlotOutcome::Written { .. } if targets.show => show(&targets.plot),
        _ => Ok(()),
    });
    collect(&mut failures, "plot", plot);

    match failures.into_iter().next() {
        Some(e) => Err(e),
        None => {
            info!(rows = summaries.len(), "Report complete");
            Ok(())
        }
    }
}

fn collect(failures: &mut Vec<anyhow::Error>, output: &str, result: Result<()>) {
    if let Err(e) = result {
        error!(output, error = %e, "Report output failed");
        failures.push(e);
    }
}
