//! `.npy` persistence for embeddings, labels and 2D projections.

use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, write_npy, ReadNpyError, ReadNpyExt, WriteNpyExt};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VizError;

/// Embedding vectors with one cluster label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingSet {
    embeddings: Array2<f32>,
    labels: Array1<i64>,
}

impl EmbeddingSet {
    pub fn new(embeddings: Array2<f32>, labels: Array1<i64>) -> Result<Self, VizError> {
        if embeddings.nrows() != labels.len() {
            return Err(VizError::shape(
                "embedding labels",
                embeddings.nrows(),
                labels.len(),
            ));
        }
        Ok(Self { embeddings, labels })
    }

    pub fn embeddings(&self) -> &Array2<f32> {
        &self.embeddings
    }

    pub fn labels(&self) -> &Array1<i64> {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.embeddings.ncols()
    }

    /// Write embeddings and labels to their two `.npy` files
    pub fn save(&self, paths: &ArtifactPaths) -> Result<(), VizError> {
        write_array(&paths.embeddings, &self.embeddings)?;
        write_array(&paths.labels, &self.labels)?;
        log::info!(
            "💾 Saved {} embeddings of dim {} to {}",
            self.len(),
            self.dim(),
            paths.embeddings.display()
        );
        Ok(())
    }

    pub fn load(paths: &ArtifactPaths) -> Result<Self, VizError> {
        let embeddings: Array2<f32> = match read_array(&paths.embeddings)? {
            Some(array) => array,
            None => read_array::<Array2<f64>>(&paths.embeddings)?
                .map(|array| array.mapv(|v| v as f32))
                .ok_or_else(|| unsupported_dtype(&paths.embeddings))?,
        };
        let labels = load_labels(&paths.labels)?;
        Self::new(embeddings, labels)
    }
}

/// File locations derived from a trained model checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model_name: String,
    pub embeddings: PathBuf,
    pub labels: PathBuf,
    pub projection: PathBuf,
}

impl ArtifactPaths {
    /// `../trained_models/trained_model_7.pt` becomes `trained_model_7`, whose
    /// arrays live at `<dir>/trained_model_7_embedding.npy` and friends.
    pub fn from_checkpoint(embedding_dir: &Path, checkpoint: &Path) -> Result<Self, VizError> {
        let file_name = checkpoint
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| VizError::Checkpoint {
                path: checkpoint.to_path_buf(),
                reason: "checkpoint path has no file name".to_string(),
            })?;
        let model_name = file_name.split('.').next().unwrap_or(file_name).to_string();

        Ok(Self {
            embeddings: embedding_dir.join(format!("{}_embedding.npy", model_name)),
            labels: embedding_dir.join(format!("{}_label.npy", model_name)),
            projection: embedding_dir.join(format!("{}_tsne_embedding.npy", model_name)),
            model_name,
        })
    }
}

/// Load cluster labels stored as int64, int32, float64 or float32.
pub fn load_labels(path: &Path) -> Result<Array1<i64>, VizError> {
    if let Some(labels) = read_array::<Array1<i64>>(path)? {
        return Ok(labels);
    }
    if let Some(labels) = read_array::<Array1<i32>>(path)? {
        return Ok(labels.mapv(i64::from));
    }
    if let Some(labels) = read_array::<Array1<f64>>(path)? {
        return Ok(labels.mapv(|v| v as i64));
    }
    if let Some(labels) = read_array::<Array1<f32>>(path)? {
        return Ok(labels.mapv(|v| v as i64));
    }
    Err(unsupported_dtype(path))
}

/// Load an `N x 2` projection stored as float64 or float32.
pub fn load_projection(path: &Path) -> Result<Array2<f64>, VizError> {
    let projection = match read_array::<Array2<f64>>(path)? {
        Some(array) => array,
        None => read_array::<Array2<f32>>(path)?
            .map(|array| array.mapv(f64::from))
            .ok_or_else(|| unsupported_dtype(path))?,
    };
    if projection.ncols() < 2 {
        return Err(VizError::shape(
            format!("projection columns in {}", path.display()),
            2,
            projection.ncols(),
        ));
    }
    Ok(projection)
}

/// Read an array, returning `None` when the file holds a different dtype.
fn read_array<T: ReadNpyExt>(path: &Path) -> Result<Option<T>, VizError> {
    match read_npy::<_, T>(path) {
        Ok(array) => Ok(Some(array)),
        Err(ReadNpyError::WrongDescriptor(_)) => Ok(None),
        Err(ReadNpyError::Io(source)) => Err(VizError::DataLoad {
            path: path.to_path_buf(),
            source,
        }),
        Err(source) => Err(VizError::NpyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_array<T: WriteNpyExt>(path: &Path, array: &T) -> Result<(), VizError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| VizError::DataLoad {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    write_npy(path, array).map_err(|source| VizError::NpyWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn unsupported_dtype(path: &Path) -> VizError {
    VizError::UnsupportedDtype {
        path: path.to_path_buf(),
    }
}
