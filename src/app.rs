use std::path::PathBuf;

use crate::arrays::{load_labels, load_projection};
use crate::config::{LossPlotPaths, VisualizerArgs};
use crate::embed::EmbeddingGenerator;
use crate::error::VizError;
use crate::history::{BestEpoch, TrainingLog};
use crate::loss_plot::plot_training_log;
use crate::scatter::render_scatter;
use crate::selection::select_clusters;
use crate::settings::GenerationSettings;

/// What a visualizer invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualizerOutcome {
    /// Embedding and label arrays written.
    Generated {
        embeddings: PathBuf,
        labels: PathBuf,
        count: usize,
    },
    /// Scatter plot written.
    Plotted { image: PathBuf, points: usize },
}

pub fn run_loss_plot(paths: &LossPlotPaths) -> Result<BestEpoch, VizError> {
    let log = TrainingLog::load(&paths.log)?;
    plot_training_log(&log, &paths.image)
}

/// Either generate embeddings (with `--embed`) or plot the saved projection.
///
/// Generation needs the external encoder pipeline; pass `None` when none is
/// available and `--embed` becomes an error.
pub fn run_visualizer(
    args: &VisualizerArgs,
    generator: Option<&dyn EmbeddingGenerator>,
) -> Result<VisualizerOutcome, VizError> {
    let artifacts = args.artifacts()?;

    if args.embed {
        let generator = generator.ok_or(VizError::GeneratorUnavailable)?;
        let run = generator.generate(&args.generation_paths(), &GenerationSettings::default())?;
        log::info!("shape of generated embeddings: [{}, {}]", run.set.len(), run.set.dim());
        log::info!("shape of labels: [{}]", run.set.labels().len());
        run.save(&artifacts)?;
        return Ok(VisualizerOutcome::Generated {
            embeddings: artifacts.embeddings,
            labels: artifacts.labels,
            count: run.set.len(),
        });
    }

    let labels = load_labels(&artifacts.labels)?;
    let projection = load_projection(&artifacts.projection)?;
    let clusters = args.cluster_list();
    log::info!("🎨 Plotting clusters {:?}", clusters);

    let selection = select_clusters(projection.view(), labels.view(), &clusters)?;
    let image = args.output_path(&artifacts);
    render_scatter(&selection, &image)?;

    Ok(VisualizerOutcome::Plotted {
        image,
        points: selection.len(),
    })
}
