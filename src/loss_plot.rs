use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::Path;

use crate::error::VizError;
use crate::history::{BestEpoch, TrainingLog};

const CHART_SIZE: (u32, u32) = (1000, 800);
const FONT_SIZE: u32 = 22;

// matplotlib's default color cycle, so charts match the older figures
const TRAIN_LOSS_COLOR: RGBColor = RGBColor(31, 119, 180);
const TRAIN_ACC_COLOR: RGBColor = RGBColor(255, 127, 14);
const VAL_LOSS_COLOR: RGBColor = RGBColor(44, 160, 44);
const VAL_ACC_COLOR: RGBColor = RGBColor(214, 39, 40);
const REFERENCE_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Plot train/val loss and accuracy per epoch, marking the epoch with the
/// lowest validation loss, and save the chart as a PNG.
pub fn plot_training_log<P: AsRef<Path>>(
    log: &TrainingLog,
    output_path: P,
) -> Result<BestEpoch, VizError> {
    let output_path = output_path.as_ref();
    let best = log.best_epoch()?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| VizError::DataLoad {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    draw_training_log(log, &best, output_path).map_err(|e| VizError::Plot(e.to_string()))?;

    log::info!(
        "📊 Loss plot saved to: {} (best epoch {}, {})",
        output_path.display(),
        best.epoch,
        best.annotation()
    );
    Ok(best)
}

fn draw_training_log(
    log: &TrainingLog,
    best: &BestEpoch,
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let epochs = log.epochs();
    let label_y = best.val_acc + 0.05;

    let values = log
        .train_losses
        .iter()
        .chain(log.train_accs.iter())
        .chain(log.val_losses.iter())
        .chain(log.val_accs.iter())
        .copied()
        .filter(|v| v.is_finite());
    let (min_value, max_value) = values.fold((0.0f64, label_y), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let y_range = (min_value - 0.05)..(max_value + 0.1);
    let x_range = 0.0f64..(epochs as f64 + 1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("loss & acc", ("sans-serif", FONT_SIZE + 8).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc("loss & acc")
        .label_style(("sans-serif", FONT_SIZE))
        .x_label_formatter(&|x| format!("{:.0}", x))
        .draw()?;

    // Reference line at the best epoch
    let best_x = best.epoch as f64;
    chart.draw_series(DashedLineSeries::new(
        vec![(best_x, y_range.start), (best_x, y_range.end)],
        10,
        6,
        REFERENCE_COLOR.stroke_width(2),
    ))?;
    chart.draw_series(std::iter::once(Text::new(
        best.annotation(),
        (best_x + 0.5, label_y),
        ("sans-serif", FONT_SIZE).into_font(),
    )))?;

    let series = [
        ("Train loss", &log.train_losses, TRAIN_LOSS_COLOR),
        ("Train acc", &log.train_accs, TRAIN_ACC_COLOR),
        ("Val loss", &log.val_losses, VAL_LOSS_COLOR),
        ("Val acc", &log.val_accs, VAL_ACC_COLOR),
    ];
    for (label, values, color) in series {
        chart
            .draw_series(LineSeries::new(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| ((i + 1) as f64, *v)),
                color.stroke_width(2),
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .label_font(("sans-serif", FONT_SIZE))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
