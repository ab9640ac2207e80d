pub mod classifier;
pub mod config;
pub mod error;
pub mod interface;
pub mod labels;
pub mod logging;
pub mod model_host;
pub mod predictions;
pub mod preprocessing;
pub mod server;
