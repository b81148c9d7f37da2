use std::path::Path;

use anyhow::{bail, Result};
use plotters::prelude::*;

/// Least-squares fit `y = slope * x + intercept`. Degenerate inputs (no
/// spread in x) fall back to a flat line at the mean of y.
pub fn linear_fit(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len().min(y.len());
    if n == 0 {
        return (0.0, 0.0);
    }
    let n_f = n as f64;
    let mean_x = x[..n].iter().sum::<f64>() / n_f;
    let mean_y = y[..n].iter().sum::<f64>() / n_f;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (xi, yi) in x[..n].iter().zip(&y[..n]) {
        covariance += (xi - mean_x) * (yi - mean_y);
        variance += (xi - mean_x).powi(2);
    }

    if variance == 0.0 {
        return (0.0, mean_y);
    }
    let slope = covariance / variance;
    (slope, mean_y - slope * mean_x)
}

/// Renders the predicted-vs-actual scatter with the fitted regression line
/// overlaid and the evaluation metrics annotated in the corner.
pub fn scatter_plot(
    path: &Path,
    actual: &[f64],
    predicted: &[f64],
    rmse: f64,
    r2: f64,
) -> Result<()> {
    if actual.is_empty() || actual.len() != predicted.len() {
        bail!("nothing to plot: need matching non-empty actual/predicted series");
    }

    let (x_min, x_max) = padded_range(actual);
    let (y_min, y_max) = padded_range(predicted);

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("test data")
        .y_desc("predict data")
        .draw()?;

    chart.draw_series(
        actual
            .iter()
            .zip(predicted)
            .map(|(&x, &y)| Circle::new((x, y), 3, BLUE.filled())),
    )?;

    let (slope, intercept) = linear_fit(actual, predicted);
    chart.draw_series(LineSeries::new(
        [
            (x_min, slope * x_min + intercept),
            (x_max, slope * x_max + intercept),
        ],
        &RED,
    ))?;

    let label_style = ("sans-serif", 18).into_font().color(&BLACK);
    root.draw(&Text::new(
        format!("rmse: {rmse:.4}"),
        (60, 40),
        label_style.clone(),
    ))?;
    root.draw(&Text::new(
        format!("r2 score: {r2:.4}"),
        (60, 64),
        label_style,
    ))?;

    root.present()?;
    Ok(())
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((max - min) * 0.05).max(1e-6);
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::linear_fit;

    #[test]
    fn recovers_a_linear_relationship() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];

        let (slope, intercept) = linear_fit(&x, &y);
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_x_falls_back_to_mean() {
        let x = [2.0, 2.0, 2.0];
        let y = [1.0, 2.0, 3.0];

        let (slope, intercept) = linear_fit(&x, &y);
        assert_eq!(slope, 0.0);
        assert_eq!(intercept, 2.0);
    }
}
