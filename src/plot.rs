//! Result plotting.
//!
//! Reads arrays out of a result bundle and renders one predicted-vs-true
//! chart per dependent variable, plus the training loss history on a log
//! scale. Plotting never trains; a missing bundle surfaces as a missing
//! artifact long before this module runs.

use crate::bundle::{PRED_PREFIX, TRUE_PREFIX, ResultBundle};
use crate::error::{Error, Result};
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Padded axis range over one or more series.
fn padded_range<'a>(series: impl Iterator<Item = &'a f64>) -> Range<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in series {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((max - min) * 0.05).max(1e-9);
    (min - pad)..(max + pad)
}

/// One chart per dependent variable: predicted curve in red, true curve (when
/// the bundle carries one) in blue, against the bundle's first independent
/// variable. Returns the files written.
pub fn plot_validation(bundle: &ResultBundle, dir: &Path) -> Result<Vec<PathBuf>> {
    let axis_name = bundle
        .independent_variables()
        .into_iter()
        .next()
        .ok_or_else(|| Error::Plot("bundle has no independent-variable array".into()))?;
    // the load path already checked row counts, so the unwrap below cannot
    // fire for a bundle that came through `ResultBundle::load`
    let axis = bundle.get(&axis_name).unwrap().to_vec();

    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for variable in bundle.dependent_variables() {
        let predicted = bundle.get(&format!("{PRED_PREFIX}{variable}")).unwrap();
        let truth = bundle.get(&format!("{TRUE_PREFIX}{variable}"));
        let path = dir.join(format!("{variable}.png"));
        draw_comparison(&path, &variable, &axis_name, &axis, predicted, truth)?;
        written.push(path);
    }
    Ok(written)
}

fn draw_comparison(
    path: &Path,
    variable: &str,
    axis_name: &str,
    axis: &[f64],
    predicted: &[f64],
    truth: Option<&[f64]>,
) -> Result<()> {
    let plot = |path: &Path| -> std::result::Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
        root.fill(&WHITE)?;
        let y_range = padded_range(predicted.iter().chain(truth.into_iter().flatten()));
        let mut chart = ChartBuilder::on(&root)
            .caption(variable, ("sans-serif", 40).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(padded_range(axis.iter()), y_range)?;
        chart
            .configure_mesh()
            .x_desc(axis_name)
            .y_desc(variable)
            .draw()?;
        chart
            .draw_series(LineSeries::new(
                axis.iter().copied().zip(predicted.iter().copied()),
                &RED,
            ))?
            .label("predicted")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        if let Some(truth) = truth {
            chart
                .draw_series(LineSeries::new(
                    axis.iter().copied().zip(truth.iter().copied()),
                    &BLUE,
                ))?
                .label("true")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        }
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    };
    plot(path).map_err(|e| Error::Plot(format!("'{}': {e}", path.display())))
}

/// Training loss on a log10 scale, one point per recorded step.
pub fn plot_loss_history(history: &[f64], record_freq: usize, path: &Path) -> Result<()> {
    let plot = |path: &Path| -> std::result::Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
        root.fill(&WHITE)?;
        let logs: Vec<f64> = history.iter().map(|v| v.max(1e-12).log10()).collect();
        let mut chart = ChartBuilder::on(&root)
            .caption("Loss History", ("sans-serif", 40).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..history.len(), padded_range(logs.iter()))?;
        chart
            .configure_mesh()
            .y_desc("Loss (log10 scale)")
            .x_desc(format!("Steps (x{record_freq})"))
            .draw()?;
        chart
            .draw_series(LineSeries::new(logs.iter().copied().enumerate(), &RED))?
            .label("Total Loss")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    };
    plot(path).map_err(|e| Error::Plot(format!("'{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_range_handles_flat_series() {
        let flat = [1.0, 1.0, 1.0];
        let range = padded_range(flat.iter());
        assert!(range.start < 1.0 && range.end > 1.0);
    }

    #[test]
    fn plots_one_file_per_dependent_variable() {
        let mut bundle = ResultBundle::new();
        bundle.insert("t", vec![0.0, 0.5, 1.0]).unwrap();
        bundle.insert("pred_x", vec![0.0, 0.2, 0.4]).unwrap();
        bundle.insert("true_x", vec![0.0, 0.25, 0.5]).unwrap();
        bundle.insert("pred_y", vec![1.0, 0.5, 0.0]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let files = plot_validation(&bundle, dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        for file in files {
            assert!(file.exists());
        }
    }

    #[test]
    fn loss_history_chart_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.png");
        plot_loss_history(&[1.0, 0.1, 0.01], 200, &path).unwrap();
        assert!(path.exists());
    }
}
