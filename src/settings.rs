use std::path::PathBuf;

/// Pocket features the encoder was trained on.
pub const DEFAULT_FEATURES: [&str; 5] = [
    "charge",
    "hydrophobicity",
    "binding_probability",
    "distance_to_center",
    "sequence_entropy",
];

/// Architecture of the Siamese pocket encoder, handed to its factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSpec {
    pub num_features: usize,
    pub dim: usize,
    pub train_eps: bool,
    pub num_edge_attr: usize,
}

/// Knobs for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub num_classes: usize,
    /// Clusters larger than this are sampled down.
    pub cluster_cap: usize,
    pub batch_size: usize,
    pub normalize: bool,
    pub embedding_dim: usize,
    pub features: Vec<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            num_classes: 60,
            cluster_cap: 10_000,
            batch_size: 4,
            normalize: true,
            embedding_dim: 32,
            features: DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl GenerationSettings {
    pub fn num_workers(&self) -> usize {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.batch_size.min(cpus)
    }

    pub fn encoder_spec(&self) -> EncoderSpec {
        EncoderSpec {
            num_features: self.features.len(),
            dim: self.embedding_dim,
            train_eps: true,
            num_edge_attr: 1,
        }
    }
}

/// Inputs read while generating embeddings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPaths {
    pub cluster_file: PathBuf,
    pub pocket_dir: PathBuf,
    pub pop_dir: PathBuf,
    pub checkpoint: PathBuf,
}
