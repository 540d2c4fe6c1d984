//! Embedding generation for the held-out pocket clusters.
//!
//! The Siamese encoder, the pocket loader and the cluster utilities live
//! outside this crate. They are plugged in through the traits below; this
//! module wires them together and runs the encoder over the test clusters.

use burn::{
    data::dataloader::DataLoader,
    module::Module,
    tensor::{backend::Backend, Tensor},
};
use ndarray::{Array1, Array2};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::arrays::{ArtifactPaths, EmbeddingSet};
use crate::checkpoint::restore_encoder;
use crate::device::DeviceProbe;
use crate::error::VizError;
use crate::settings::{EncoderSpec, GenerationPaths, GenerationSettings};

/// Pocket identifiers grouped by cluster.
pub type Clusters = Vec<Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSplit {
    pub train: Clusters,
    pub val: Clusters,
    pub test: Clusters,
}

/// Reads, ranks and divides the clustered pockets.
pub trait ClusterCatalog {
    fn read_clusters(&self, path: &Path) -> Result<Clusters, VizError>;

    /// Keep the `num_classes` largest clusters, sampling each down to `cluster_cap`.
    fn select_classes(&self, clusters: Clusters, num_classes: usize, cluster_cap: usize)
        -> Clusters;

    fn divide_clusters(&self, clusters: Clusters) -> ClusterSplit;
}

/// A batch that knows the cluster label of each of its pockets.
pub trait LabeledBatch {
    fn labels(&self) -> Vec<i64>;
}

/// Maps a batch of pockets to one embedding row per pocket.
pub trait PocketEncoder<B: Backend>: Module<B> {
    type Batch: LabeledBatch;

    fn embed(&self, batch: Self::Batch) -> Tensor<B, 2>;
}

/// Builds an untrained encoder with the given architecture.
pub trait EncoderFactory<B: Backend> {
    type Encoder: PocketEncoder<B>;

    fn init(&self, spec: &EncoderSpec, device: &B::Device) -> Self::Encoder;
}

/// Everything the pocket loader needs to iterate over a set of clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderRequest<'a> {
    pub pocket_dir: &'a Path,
    pub pop_dir: &'a Path,
    pub clusters: &'a Clusters,
    pub features: &'a [String],
    pub batch_size: usize,
    pub shuffle: bool,
    pub num_workers: usize,
}

pub trait PocketLoaderFactory<B: Backend, O> {
    fn build(
        &self,
        request: LoaderRequest<'_>,
        device: &B::Device,
    ) -> Result<Arc<dyn DataLoader<B, O>>, VizError>;
}

/// The external pieces a generation run is assembled from.
pub struct Collaborators<'a, C, F, L> {
    pub catalog: &'a C,
    pub encoders: &'a F,
    pub loaders: &'a L,
}

/// Embeddings of the test clusters plus the cluster ids actually seen.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRun {
    pub set: EmbeddingSet,
    pub clusters: BTreeSet<i64>,
}

impl EmbeddingRun {
    pub fn save(&self, artifacts: &ArtifactPaths) -> Result<(), VizError> {
        self.set.save(artifacts)
    }
}

/// Run `encoder` over every batch of `loader`, L2-normalising rows when asked.
pub fn compute_embeddings<B, E>(
    loader: &dyn DataLoader<B, E::Batch>,
    encoder: &E,
    normalize: bool,
) -> Result<EmbeddingRun, VizError>
where
    B: Backend,
    E: PocketEncoder<B>,
{
    let mut values: Vec<f32> = Vec::new();
    let mut labels: Vec<i64> = Vec::new();
    let mut dim: Option<usize> = None;

    for (batch_index, batch) in loader.iter().enumerate() {
        let batch_labels = batch.labels();
        let mut output = encoder.embed(batch);
        if normalize {
            output = l2_normalize(output);
        }

        let [rows, cols] = output.dims();
        if rows != batch_labels.len() {
            return Err(VizError::shape(
                format!("embeddings in batch {}", batch_index),
                batch_labels.len(),
                rows,
            ));
        }
        match dim {
            Some(expected) if expected != cols => {
                return Err(VizError::shape("embedding dimension", expected, cols));
            }
            _ => dim = Some(cols),
        }

        let data = output
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| VizError::Tensor(format!("{:?}", e)))?;
        values.extend(data);
        labels.extend(batch_labels);
        log::debug!("batch {}: {} pockets embedded", batch_index, rows);
    }

    let dim = dim.unwrap_or(0);
    let embeddings = Array2::from_shape_vec((labels.len(), dim), values)
        .map_err(|_| VizError::shape("embedding buffer", labels.len() * dim, 0))?;
    let clusters: BTreeSet<i64> = labels.iter().copied().collect();
    let set = EmbeddingSet::new(embeddings, Array1::from(labels))?;

    Ok(EmbeddingRun { set, clusters })
}

fn l2_normalize<B: Backend>(embeddings: Tensor<B, 2>) -> Tensor<B, 2> {
    let [_, cols] = embeddings.dims();
    let norms = embeddings
        .clone()
        .powf_scalar(2.0)
        .sum_dim(1)
        .sqrt()
        .clamp_min(1e-12)
        .repeat_dim(1, cols);
    embeddings.div(norms)
}

/// Embed the test split of the selected clusters with a trained encoder.
///
/// `B` must be an inference backend (e.g. `Wgpu`, not `Autodiff<Wgpu>`) so
/// that dropout and other training-only layers are inactive; an autodiff
/// backend is rejected with [`VizError::AutodiffBackend`].
pub fn generate_embeddings<B, C, F, L, P>(
    paths: &GenerationPaths,
    settings: &GenerationSettings,
    collaborators: Collaborators<'_, C, F, L>,
    probe: &P,
) -> Result<EmbeddingRun, VizError>
where
    B: Backend,
    C: ClusterCatalog,
    F: EncoderFactory<B>,
    L: PocketLoaderFactory<B, <F::Encoder as PocketEncoder<B>>::Batch>,
    P: DeviceProbe<B>,
{
    if B::ad_enabled() {
        return Err(VizError::AutodiffBackend);
    }

    let device = probe.select();
    let num_workers = settings.num_workers();
    log::info!("batch size: {}", settings.batch_size);
    log::info!("number of workers to load data: {}", num_workers);
    log::info!("number of classes: {}", settings.num_classes);

    let clusters = collaborators.catalog.read_clusters(&paths.cluster_file)?;
    let clusters =
        collaborators
            .catalog
            .select_classes(clusters, settings.num_classes, settings.cluster_cap);
    let split = collaborators.catalog.divide_clusters(clusters);
    log::info!("📊 Pockets per split:");
    log::info!("  - Training: {}", pocket_count(&split.train));
    log::info!("  - Validation: {}", pocket_count(&split.val));
    log::info!("  - Test: {}", pocket_count(&split.test));

    let encoder = collaborators
        .encoders
        .init(&settings.encoder_spec(), &device);
    let encoder = restore_encoder::<B, _>(encoder, &paths.checkpoint, &device)?;

    let loader = collaborators.loaders.build(
        LoaderRequest {
            pocket_dir: &paths.pocket_dir,
            pop_dir: &paths.pop_dir,
            clusters: &split.test,
            features: &settings.features,
            batch_size: settings.batch_size,
            shuffle: false,
            num_workers,
        },
        &device,
    )?;

    log::info!("🔍 Computing embeddings over {} pockets...", loader.num_items());
    let run = compute_embeddings::<B, _>(loader.as_ref(), &encoder, settings.normalize)?;
    log::info!(
        "✅ Generated embeddings: [{}, {}], labels: [{}], clusters present: {}",
        run.set.len(),
        run.set.dim(),
        run.set.labels().len(),
        run.clusters.len()
    );
    Ok(run)
}

fn pocket_count(clusters: &Clusters) -> usize {
    clusters.iter().map(|c| c.len()).sum()
}

/// Object-safe entry point so the CLI can run generation without knowing the
/// backend or the collaborator types.
pub trait EmbeddingGenerator {
    fn generate(
        &self,
        paths: &GenerationPaths,
        settings: &GenerationSettings,
    ) -> Result<EmbeddingRun, VizError>;
}

/// An [`EmbeddingGenerator`] backed by concrete collaborators and a device probe.
pub struct Pipeline<B, C, F, L, P> {
    pub catalog: C,
    pub encoders: F,
    pub loaders: L,
    pub probe: P,
    _backend: std::marker::PhantomData<B>,
}

impl<B, C, F, L, P> Pipeline<B, C, F, L, P> {
    pub fn new(catalog: C, encoders: F, loaders: L, probe: P) -> Self {
        Self {
            catalog,
            encoders,
            loaders,
            probe,
            _backend: std::marker::PhantomData,
        }
    }
}

impl<B, C, F, L, P> EmbeddingGenerator for Pipeline<B, C, F, L, P>
where
    B: Backend,
    C: ClusterCatalog,
    F: EncoderFactory<B>,
    L: PocketLoaderFactory<B, <F::Encoder as PocketEncoder<B>>::Batch>,
    P: DeviceProbe<B>,
{
    fn generate(
        &self,
        paths: &GenerationPaths,
        settings: &GenerationSettings,
    ) -> Result<EmbeddingRun, VizError> {
        generate_embeddings(
            paths,
            settings,
            Collaborators {
                catalog: &self.catalog,
                encoders: &self.encoders,
                loaders: &self.loaders,
            },
            &self.probe,
        )
    }
}
