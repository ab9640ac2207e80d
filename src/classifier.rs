use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use ndarray::{Array2, Array4};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

pub const DEFAULT_INTRA_THREADS: usize = 4;

/// Anything that can score a batch of preprocessed images against a fixed set of classes.
pub trait Classifier: Send + Sync
{
    /// Takes a batch of shape (batch_size, height, width, channels).
    /// Returns a 2D array of shape (batch_size, class_count), one score per class.
    fn predict(&self, images: Array4<f32>) -> anyhow::Result<Array2<f32>>;
}

/// The MobileNetV2 ImageNet classifier.
///
/// Uses an ONNX export of the Keras `MobileNetV2(weights='imagenet')` model, so the
/// input layout is NHWC with values in [-1, 1] and the output is already a softmax
/// distribution over the 1000 ImageNet classes.
///
/// The session is loaded once and kept for the whole process. ONNX Runtime needs
/// exclusive access to run a session, so calls are serialized through a mutex;
/// nothing else about the model changes after loading.
pub struct MobileNetV2
{
    session: Mutex<Session>,
}

impl MobileNetV2
{
    pub fn new(model_path: &Path, intra_threads: usize) -> anyhow::Result<Self>
    {
        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.with_intra_threads(intra_threads))
            .and_then(|builder| builder.commit_from_file(model_path))
            .with_context(|| format!("Error loading ONNX model from {:?}", model_path))?;

        Ok( MobileNetV2 { session: Mutex::new(session) } )
    }
}

impl Classifier for MobileNetV2
{
    fn predict(&self, images: Array4<f32>) -> anyhow::Result<Array2<f32>>
    {
        let (batch, height, width, channels) = images.dim();
        let data: Vec<f32> = images.iter().copied().collect();
        let input = Tensor::from_array(([batch, height, width, channels], data))?;

        let mut session = self.session.lock()
            .map_err(|_| anyhow::anyhow!("Classifier session lock was poisoned"))?;
        let outputs = session.run(ort::inputs![input])?;

        // First dimension is each image in the batch; the second is the score per class.
        let (shape, scores) = outputs[0].try_extract_tensor::<f32>()?;
        if shape.len() != 2 {
            anyhow::bail!("Expected a 2D classifier output, got shape {:?}", shape);
        }
        let scores = Array2::from_shape_vec((shape[0] as usize, shape[1] as usize), scores.to_vec())?;

        Ok(scores)
    }
}
