use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::arrays::ArtifactPaths;
use crate::error::VizError;
use crate::settings::GenerationPaths;

/// Plot loss and accuracy curves of a classifier run.
#[derive(Debug, Clone, Parser)]
#[command(name = "plot_loss")]
pub struct LossPlotArgs {
    /// Which experiment run to plot.
    #[arg(long)]
    pub run: u32,

    /// Directory holding the `classifier_run_<N>` folders.
    #[arg(long, default_value = "./results")]
    pub results_dir: PathBuf,
}

/// Input log and output image of one classifier run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossPlotPaths {
    pub log: PathBuf,
    pub image: PathBuf,
}

impl LossPlotArgs {
    pub fn paths(&self) -> LossPlotPaths {
        let run_dir = self.results_dir.join(format!("classifier_run_{}", self.run));
        LossPlotPaths {
            log: run_dir.join(format!("train_classifier_results_{}.json", self.run)),
            image: run_dir.join(format!("loss_{}.png", self.run)),
        }
    }
}

/// Cluster groups picked out while reviewing per-cluster test accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClusterPreset {
    /// Clusters above 70% accuracy.
    #[value(name = "above-70")]
    Above70,
    /// Clusters in the 40-60% range.
    #[value(name = "mid-40-60")]
    Mid40To60,
    #[value(name = "above-30")]
    Above30,
    #[value(name = "above-20")]
    Above20,
    #[value(name = "above-10")]
    Above10,
    /// Clusters the model gets entirely wrong.
    Failure,
}

impl ClusterPreset {
    pub fn clusters(self) -> Vec<i64> {
        match self {
            ClusterPreset::Above70 => vec![20, 31, 33, 36, 39, 45, 46, 54, 58, 59],
            ClusterPreset::Mid40To60 => vec![6, 18, 20, 29, 32, 38, 43, 55],
            ClusterPreset::Above30 => vec![2, 4, 15, 34, 44],
            ClusterPreset::Above20 => vec![3, 12, 19, 21, 47, 52, 53],
            ClusterPreset::Above10 => vec![13, 14, 17, 22, 23, 27, 37, 40, 41, 57],
            ClusterPreset::Failure => vec![0, 1, 7, 8, 9, 10, 11, 16, 25, 26, 28],
        }
    }
}

/// Generate pocket embeddings, or plot a 2D projection of saved ones.
#[derive(Debug, Clone, Parser)]
#[command(name = "visualize_embeddings")]
pub struct VisualizerArgs {
    /// Generate and save embeddings instead of plotting.
    #[arg(long)]
    pub embed: bool,

    /// Directory for the embedding, label and projection arrays.
    #[arg(long, default_value = "../embeddings/")]
    pub embedding_dir: PathBuf,

    /// Text file with the cluster assignment of every pocket.
    #[arg(long, default_value = "../data/googlenet-classes")]
    pub cluster_file: PathBuf,

    /// Directory of pockets.
    #[arg(long, default_value = "../data/googlenet-dataset/")]
    pub pocket_dir: PathBuf,

    /// Directory of popsa files for the sasa feature.
    #[arg(long, default_value = "../data/pops-googlenet/")]
    pub pop_dir: PathBuf,

    /// Trained encoder checkpoint.
    #[arg(long, default_value = "../trained_models/trained_model_7.pt")]
    pub trained_model: PathBuf,

    /// Cluster group to plot.
    #[arg(long, value_enum, default_value_t = ClusterPreset::Mid40To60)]
    pub preset: ClusterPreset,

    /// Explicit cluster labels to plot; overrides --preset.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub clusters: Option<Vec<i64>>,

    /// Output image; defaults to `embedding_visualization/<model name>.png`.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl VisualizerArgs {
    pub fn artifacts(&self) -> Result<ArtifactPaths, VizError> {
        ArtifactPaths::from_checkpoint(&self.embedding_dir, &self.trained_model)
    }

    pub fn generation_paths(&self) -> GenerationPaths {
        GenerationPaths {
            cluster_file: self.cluster_file.clone(),
            pocket_dir: self.pocket_dir.clone(),
            pop_dir: self.pop_dir.clone(),
            checkpoint: self.trained_model.clone(),
        }
    }

    pub fn cluster_list(&self) -> Vec<i64> {
        match &self.clusters {
            Some(clusters) => clusters.clone(),
            None => self.preset.clusters(),
        }
    }

    pub fn output_path(&self, artifacts: &ArtifactPaths) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => Path::new("embedding_visualization")
                .join(format!("{}.png", artifacts.model_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_paths_follow_run_layout() {
        let args = LossPlotArgs::parse_from(["plot_loss", "--run", "7"]);
        let paths = args.paths();
        assert_eq!(
            paths.log,
            PathBuf::from("./results/classifier_run_7/train_classifier_results_7.json")
        );
        assert_eq!(
            paths.image,
            PathBuf::from("./results/classifier_run_7/loss_7.png")
        );
    }

    #[test]
    fn loss_run_is_required() {
        assert!(LossPlotArgs::try_parse_from(["plot_loss"]).is_err());
        assert!(LossPlotArgs::try_parse_from(["plot_loss", "--run", "seven"]).is_err());
    }

    #[test]
    fn visualizer_defaults() {
        let args = VisualizerArgs::parse_from(["visualize_embeddings"]);
        assert!(!args.embed);
        assert_eq!(args.cluster_list(), vec![6, 18, 20, 29, 32, 38, 43, 55]);

        let artifacts = args.artifacts().unwrap();
        assert_eq!(artifacts.model_name, "trained_model_7");
        assert_eq!(
            args.output_path(&artifacts),
            PathBuf::from("embedding_visualization/trained_model_7.png")
        );
        assert_eq!(
            args.generation_paths().checkpoint,
            PathBuf::from("../trained_models/trained_model_7.pt")
        );
    }

    #[test]
    fn explicit_clusters_override_preset() {
        let args = VisualizerArgs::parse_from([
            "visualize_embeddings",
            "--preset",
            "failure",
            "--clusters",
            "3,1,99",
            "--output",
            "out/plot.png",
        ]);
        assert_eq!(args.cluster_list(), vec![3, 1, 99]);
        let artifacts = args.artifacts().unwrap();
        assert_eq!(args.output_path(&artifacts), PathBuf::from("out/plot.png"));

        let preset_only =
            VisualizerArgs::parse_from(["visualize_embeddings", "--preset", "above-30"]);
        assert_eq!(preset_only.cluster_list(), vec![2, 4, 15, 34, 44]);
    }
}
