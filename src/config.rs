use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::classifier::DEFAULT_INTRA_THREADS;

/// Serves pet identification predictions from a pretrained ImageNet classifier.
#[derive(Parser, Debug, Clone)]
#[command(name = "petsy-care", version)]
pub struct Config
{
    /// Address to bind; the default listens on all interfaces.
    #[arg(long, env = "PETSY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PETSY_PORT", default_value_t = 5000)]
    pub port: u16,

    /// ONNX export of Keras MobileNetV2 with ImageNet weights.
    #[arg(long, env = "PETSY_MODEL_PATH", default_value = "models/mobilenet_v2.onnx")]
    pub model_path: PathBuf,

    /// Keras `imagenet_class_index.json` label table.
    #[arg(long, env = "PETSY_LABELS_PATH", default_value = "models/imagenet_class_index.json")]
    pub labels_path: PathBuf,

    /// Threads ONNX Runtime may use inside a single inference.
    #[arg(long, env = "PETSY_INTRA_THREADS", default_value_t = DEFAULT_INTRA_THREADS)]
    pub intra_threads: usize,

    /// Apply a softmax to the model output, for exports that emit raw logits.
    #[arg(long, env = "PETSY_APPLY_SOFTMAX", default_value_t = false)]
    pub apply_softmax: bool,

    /// HTTP worker threads. Defaults to one per physical core.
    #[arg(long, env = "PETSY_WORKERS")]
    pub workers: Option<usize>,

    /// RUST_LOG, when set, takes precedence.
    #[arg(long, env = "PETSY_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}
