use burn::{
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};
use std::path::Path;

use crate::error::VizError;

/// Save encoder weights to disk.
///
/// `CompactRecorder` swaps the extension for `.mpk`, so `trained_model_7.pt`
/// is written as `trained_model_7.mpk`.
pub fn save_encoder<B: Backend, M: Module<B>>(model: M, path: &Path) -> Result<(), VizError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| VizError::DataLoad {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    Recorder::<B>::record(&CompactRecorder::new(), model.into_record(), path.to_path_buf())
        .map_err(|e| VizError::Checkpoint {
            path: path.to_path_buf(),
            reason: format!("{:?}", e),
        })?;

    log::info!("💾 Encoder checkpoint saved to: {}", path.display());
    Ok(())
}

/// Load trained weights into a freshly initialised encoder.
pub fn restore_encoder<B: Backend, M: Module<B>>(
    model: M,
    path: &Path,
    device: &B::Device,
) -> Result<M, VizError> {
    let record = Recorder::<B>::load(&CompactRecorder::new(), path.to_path_buf(), device)
        .map_err(|e| VizError::Checkpoint {
            path: path.to_path_buf(),
            reason: format!("{:?}", e),
        })?;

    let model = model.load_record(record);

    log::info!("📂 Encoder checkpoint loaded from: {}", path.display());
    Ok(model)
}
