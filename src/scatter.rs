use palette::{Hsl, IntoColor, Srgb};
use plotters::prelude::*;
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use crate::error::VizError;
use crate::selection::ClusterSelection;

const CHART_SIZE: (u32, u32) = (1200, 1200);
const FONT_SIZE: u32 = 24;
const POINT_RADIUS: i32 = 3;

/// `n` evenly spaced hues at fixed lightness and saturation.
///
/// Hues start at 0.01 of the color wheel with lightness 0.6 and saturation
/// 0.65, which is the categorical palette the earlier cluster figures used.
pub fn hls_palette(n: usize) -> Vec<RGBColor> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32 + 0.01).fract() * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.65, 0.6).into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            RGBColor(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

/// Scatter the selected 2D points, one color per cluster label, and save as PNG.
pub fn render_scatter<P: AsRef<Path>>(
    selection: &ClusterSelection,
    output_path: P,
) -> Result<(), VizError> {
    let output_path = output_path.as_ref();
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| VizError::DataLoad {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    draw_scatter(selection, output_path).map_err(|e| VizError::Plot(e.to_string()))?;

    log::info!(
        "📊 Embedding scatter ({} points, {} clusters) saved to: {}",
        selection.len(),
        selection.palette_size(),
        output_path.display()
    );
    Ok(())
}

fn draw_scatter(
    selection: &ClusterSelection,
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let labels = selection.distinct_labels();
    let colors: HashMap<i64, RGBColor> = labels
        .iter()
        .copied()
        .zip(hls_palette(labels.len()))
        .collect();

    let (x_range, y_range) = padded_bounds(selection.points());
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .label_style(("sans-serif", FONT_SIZE))
        .draw()?;

    chart.draw_series(selection.iter().map(|(point, label)| {
        let color = colors.get(&label).copied().unwrap_or(BLACK);
        Circle::new(point, POINT_RADIUS, color.filled())
    }))?;

    if !labels.is_empty() {
        for label in &labels {
            let color = colors[label];
            chart
                .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
                .label(label.to_string())
                .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
        }

        chart
            .configure_series_labels()
            .label_font(("sans-serif", FONT_SIZE))
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Data bounds with a 5% margin; degenerate extents widen to a unit span.
fn padded_bounds(points: &[(f64, f64)]) -> (Range<f64>, Range<f64>) {
    (
        axis_bounds(points.iter().map(|(x, _)| *x)),
        axis_bounds(points.iter().map(|(_, y)| *y)),
    )
}

fn axis_bounds<I: Iterator<Item = f64>>(values: I) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    let span = hi - lo;
    if span == 0.0 {
        return (lo - 0.5)..(hi + 0.5);
    }
    (lo - 0.05 * span)..(hi + 0.05 * span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colors() {
        assert!(hls_palette(0).is_empty());

        let colors = hls_palette(8);
        assert_eq!(colors.len(), 8);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!((a.0, a.1, a.2), (b.0, b.1, b.2));
            }
        }
    }

    #[test]
    fn first_palette_color_is_red_leaning() {
        let RGBColor(r, g, b) = hls_palette(2)[0];
        assert!(r > g && r > b, "expected reddish hue, got ({}, {}, {})", r, g, b);
    }

    #[test]
    fn bounds_handle_empty_and_single_point() {
        let (x, y) = padded_bounds(&[]);
        assert_eq!((x.start, x.end), (0.0, 1.0));
        assert_eq!((y.start, y.end), (0.0, 1.0));

        let (x, _) = padded_bounds(&[(2.0, 3.0)]);
        assert_eq!((x.start, x.end), (1.5, 2.5));

        let (x, _) = padded_bounds(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!((x.start, x.end), (-0.5, 10.5));
    }
}
