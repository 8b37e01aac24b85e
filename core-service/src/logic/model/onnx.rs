//! ONNX Classifier - ONNX Runtime Integration
//!
//! Chạy classifier đã export bằng sklearn-onnx (`zipmap=False`).
//! Expected outputs: `label` (int64) and, for probabilistic models,
//! `probabilities` (float32, M x n_classes).

use ndarray::{Array2, ArrayView2};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::classifier::{Classifier, DeterministicModel, ProbabilisticModel};
use crate::error::{ArtifactError, ChurnError, ChurnResult};

const LABEL_OUTPUT: &str = "label";
const PROBABILITY_OUTPUT: &str = "probabilities";

/// ONNX session; `run` needs `&mut Session`, so it sits behind a mutex
pub struct OnnxClassifier {
    session: Mutex<Session>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier").finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load ONNX model từ bytes (already checksum-verified by the store)
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Classifier, ArtifactError> {
        log::info!("Loading ONNX classifier from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| ArtifactError::Invalid(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactError::Invalid(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ArtifactError::Invalid(format!("Load from memory error: {}", e)))?;

        let has_label = session.outputs.iter().any(|o| o.name == LABEL_OUTPUT);
        let has_proba = session.outputs.iter().any(|o| o.name == PROBABILITY_OUTPUT);

        if !has_label && !has_proba {
            return Err(ArtifactError::Invalid(format!(
                "ONNX model exposes neither '{}' nor '{}'",
                LABEL_OUTPUT, PROBABILITY_OUTPUT
            )));
        }

        let model = OnnxClassifier {
            session: Mutex::new(session),
        };

        if has_proba {
            Ok(Classifier::Probabilistic(Box::new(model)))
        } else {
            Ok(Classifier::Deterministic(Box::new(model)))
        }
    }

    /// Run the session and copy one named output out of the session buffers
    fn run_output<T, F>(&self, x: ArrayView2<'_, f64>, output: &str, extract: F) -> ChurnResult<Vec<T>>
    where
        F: FnOnce(&ort::value::DynValue) -> Result<Vec<T>, String>,
    {
        let input: Array2<f32> = x.mapv(|v| v as f32);
        let input_tensor = Value::from_array(input)
            .map_err(|e| ChurnError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ChurnError::Inference(format!("Inference failed: {}", e)))?;

        let value = outputs
            .get(output)
            .ok_or_else(|| ChurnError::Inference(format!("No '{}' output", output)))?;

        extract(value).map_err(ChurnError::Inference)
    }
}

impl ProbabilisticModel for OnnxClassifier {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    /// Unknown until the first run
    fn n_classes(&self) -> usize {
        0
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> ChurnResult<Array2<f64>> {
        let rows = x.nrows();
        let data: Vec<f64> = self.run_output(x, PROBABILITY_OUTPUT, |value| {
            let (_, data) = value
                .try_extract_tensor::<f32>()
                .map_err(|e| format!("Extract error: {}", e))?;
            Ok(data.iter().map(|p| *p as f64).collect())
        })?;

        if rows == 0 || data.len() % rows != 0 {
            return Err(ChurnError::Inference(format!(
                "probability output has {} values for {} rows",
                data.len(),
                rows
            )));
        }
        let n_classes = data.len() / rows;

        Array2::from_shape_vec((rows, n_classes), data)
            .map_err(|e| ChurnError::Inference(format!("Array error: {}", e)))
    }
}

impl DeterministicModel for OnnxClassifier {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> Option<usize> {
        None
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> ChurnResult<Vec<i64>> {
        let rows = x.nrows();
        let labels: Vec<i64> = self.run_output(x, LABEL_OUTPUT, |value| {
            let (_, data) = value
                .try_extract_tensor::<i64>()
                .map_err(|e| format!("Extract error: {}", e))?;
            Ok(data.to_vec())
        })?;

        if labels.len() != rows {
            return Err(ChurnError::Inference(format!(
                "label output has {} values for {} rows",
                labels.len(),
                rows
            )));
        }
        Ok(labels)
    }
}
