//! Owns the pretrained classifier and its label table for the lifetime of the process.

use log::info;
use ndarray::Array4;

use crate::classifier::{Classifier, MobileNetV2};
use crate::config::Config;
use crate::error::Error;
use crate::labels::{ClassLabels, IMAGENET_CLASS_COUNT};
use crate::predictions::{self, Prediction};

pub struct ModelHost
{
    classifier: Box<dyn Classifier>,
    labels: ClassLabels,
    apply_softmax: bool,
}

impl ModelHost
{
    pub fn new(classifier: Box<dyn Classifier>, labels: ClassLabels, apply_softmax: bool) -> Self
    {
        ModelHost { classifier, labels, apply_softmax }
    }

    /// Loads the label table and the MobileNetV2 weights named by `config`.
    /// Blocks until both are in memory; any failure here should stop the process.
    pub fn load(config: &Config) -> anyhow::Result<Self>
    {
        let labels = ClassLabels::load(&config.labels_path, IMAGENET_CLASS_COUNT)?;
        info!("Loaded {} class labels from {:?}", labels.len(), config.labels_path);

        let classifier = MobileNetV2::new(&config.model_path, config.intra_threads)?;
        info!("Loaded classifier from {:?}", config.model_path);

        Ok(Self::new(Box::new(classifier), labels, config.apply_softmax))
    }

    /// Runs one forward pass over a batch of shape (batch_size, 224, 224, 3).
    /// Returns, for each image, its `top` highest-scoring classes in descending order.
    /// The input shape is only checked by the inference runtime itself.
    pub fn predict(&self, images: Array4<f32>, top: usize) -> Result<Vec<Vec<Prediction>>, Error>
    {
        let mut scores = self.classifier.predict(images)?;

        if scores.ncols() != self.labels.len() {
            return Err(Error::LabelCountMismatch { scores: scores.ncols(), labels: self.labels.len() });
        }

        if self.apply_softmax {
            predictions::softmax_rows(&mut scores);
        }

        Ok(predictions::decode_predictions(scores.view(), &self.labels, top))
    }

    /// Convenience for the single-image case: the best class for the first image of the batch.
    pub fn predict_top(&self, images: Array4<f32>) -> Result<Prediction, Error>
    {
        self.predict(images, 1)?
            .into_iter()
            .next()
            .and_then(|ranked| ranked.into_iter().next())
            .ok_or(Error::EmptyPrediction)
    }
}
