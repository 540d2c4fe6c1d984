use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::VizError;

/// Per-epoch metrics written by the classifier training run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingLog {
    pub train_losses: Vec<f64>,
    pub train_accs: Vec<f64>,
    pub val_losses: Vec<f64>,
    pub val_accs: Vec<f64>,
}

/// The epoch with the lowest validation loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestEpoch {
    /// Zero-based position in the log.
    pub index: usize,
    /// One-based epoch number, as drawn on the x axis.
    pub epoch: usize,
    pub val_loss: f64,
    pub val_acc: f64,
}

impl BestEpoch {
    /// Text drawn next to the reference line, e.g. `val acc: 0.8125`.
    ///
    /// The accuracy is printed the way the training scripts print floats and
    /// then cut to its first 6 characters; no rounding takes place.
    pub fn annotation(&self) -> String {
        let printed: String = float_repr(self.val_acc).chars().take(6).collect();
        format!("val acc: {}", printed)
    }
}

impl TrainingLog {
    /// Load a training log from its JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VizError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| VizError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let log: TrainingLog = serde_json::from_str(&json).map_err(|source| VizError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "📁 Loaded training log {} ({} epochs)",
            path.display(),
            log.epochs()
        );
        Ok(log)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), VizError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| VizError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| VizError::DataLoad {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| VizError::DataLoad {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn epochs(&self) -> usize {
        self.train_losses.len()
    }

    /// All four series must be non-empty and of equal length.
    pub fn validate(&self) -> Result<(), VizError> {
        let epochs = self.epochs();
        if epochs == 0 {
            return Err(VizError::EmptyLog);
        }
        for (name, series) in [
            ("train_accs", &self.train_accs),
            ("val_losses", &self.val_losses),
            ("val_accs", &self.val_accs),
        ] {
            if series.len() != epochs {
                return Err(VizError::shape(name, epochs, series.len()));
            }
        }
        Ok(())
    }

    /// Find the epoch of minimum validation loss; ties go to the earliest epoch.
    pub fn best_epoch(&self) -> Result<BestEpoch, VizError> {
        self.validate()?;

        let mut best: Option<(usize, f64)> = None;
        for (index, &loss) in self.val_losses.iter().enumerate() {
            if loss.is_nan() {
                continue;
            }
            match best {
                Some((_, current)) if loss >= current => {}
                _ => best = Some((index, loss)),
            }
        }

        let (index, val_loss) = best.ok_or(VizError::EmptyLog)?;
        Ok(BestEpoch {
            index,
            epoch: index + 1,
            val_loss,
            val_acc: self.val_accs[index],
        })
    }
}

/// Shortest round-trip text for a float, matching the training scripts'
/// output (`1.0` rather than `1`, `1e-05` for tiny magnitudes).
pub(crate) fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{:e}", value);
        if let Some((mantissa, exponent)) = scientific.split_once('e') {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
        }
        return scientific;
    }

    let plain = format!("{}", value);
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_with_val_losses(val_losses: Vec<f64>) -> TrainingLog {
        let n = val_losses.len();
        TrainingLog {
            train_losses: vec![1.0; n],
            train_accs: vec![0.5; n],
            val_losses,
            val_accs: (0..n).map(|i| 0.1 * (i + 1) as f64).collect(),
        }
    }

    #[test]
    fn best_epoch_takes_first_of_tied_minimum() {
        let log = log_with_val_losses(vec![0.9, 0.4, 0.4, 0.7]);
        let best = log.best_epoch().unwrap();
        assert_eq!(best.index, 1);
        assert_eq!(best.epoch, 2);
        assert_eq!(best.val_loss, 0.4);
        assert_eq!(best.val_acc, log.val_accs[1]);
    }

    #[test]
    fn best_epoch_matches_example_run() {
        let log = TrainingLog {
            train_losses: vec![1.0, 0.5],
            train_accs: vec![0.5, 0.8],
            val_losses: vec![1.1, 0.6],
            val_accs: vec![0.4, 0.7],
        };
        let best = log.best_epoch().unwrap();
        assert_eq!(best.epoch, 2);
        assert_eq!(best.annotation(), "val acc: 0.7");
    }

    #[test]
    fn best_epoch_skips_nan_losses() {
        let log = log_with_val_losses(vec![f64::NAN, 0.8, 0.3]);
        assert_eq!(log.best_epoch().unwrap().index, 2);

        let all_nan = log_with_val_losses(vec![f64::NAN, f64::NAN]);
        assert!(matches!(all_nan.best_epoch(), Err(VizError::EmptyLog)));
    }

    #[test]
    fn validate_rejects_ragged_and_empty_logs() {
        let mut log = log_with_val_losses(vec![0.5, 0.4]);
        log.val_accs.pop();
        match log.validate() {
            Err(VizError::ShapeMismatch {
                what,
                expected,
                found,
            }) => {
                assert_eq!(what, "val_accs");
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }

        let empty = log_with_val_losses(Vec::new());
        assert!(matches!(empty.validate(), Err(VizError::EmptyLog)));
    }

    #[test]
    fn annotation_truncates_printed_value() {
        let best = BestEpoch {
            index: 0,
            epoch: 1,
            val_loss: 0.1,
            val_acc: 0.8123456789,
        };
        assert_eq!(best.annotation(), "val acc: 0.8123");

        let perfect = BestEpoch { val_acc: 1.0, ..best };
        assert_eq!(perfect.annotation(), "val acc: 1.0");
    }

    #[test]
    fn float_repr_follows_script_formatting() {
        assert_eq!(float_repr(0.7), "0.7");
        assert_eq!(float_repr(1.0), "1.0");
        assert_eq!(float_repr(0.0), "0.0");
        assert_eq!(float_repr(1e-5), "1e-05");
        assert_eq!(float_repr(2.5e-7), "2.5e-07");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(f64::NAN), "nan");
    }

    #[test]
    fn load_reports_missing_file_and_missing_key() {
        let missing = TrainingLog::load("/definitely/not/here.json");
        assert!(matches!(missing, Err(VizError::DataLoad { .. })));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"train_losses": [1.0], "train_accs": [0.5], "val_losses": [1.0]}}"#)
            .unwrap();
        let parsed = TrainingLog::load(file.path());
        assert!(matches!(parsed, Err(VizError::Parse { .. })));
    }

    #[test]
    fn save_load_preserves_log() {
        let log = log_with_val_losses(vec![0.9, 0.4]);
        let file = NamedTempFile::new().unwrap();
        log.save(file.path()).unwrap();
        assert_eq!(TrainingLog::load(file.path()).unwrap(), log);
    }

    #[test]
    fn save_creates_missing_run_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("results")
            .join("classifier_run_3")
            .join("train_classifier_results_3.json");
        let log = log_with_val_losses(vec![0.9, 0.4]);

        log.save(&path).unwrap();
        assert_eq!(TrainingLog::load(&path).unwrap(), log);
    }
}
