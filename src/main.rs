use clap::Parser;
use log::info;

use petsy_care::config::Config;
use petsy_care::logging;
use petsy_care::model_host::ModelHost;
use petsy_care::server;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    logging::init(config.log_level);

    // The model must be fully loaded before the port is bound.
    info!("Loading ML model from {:?}...", config.model_path);
    let now = std::time::Instant::now();
    let model_host = ModelHost::load(&config)?;
    info!("Model loaded in {:?}", now.elapsed());

    actix_web::rt::System::new().block_on(server::startup(config, model_host))?;

    Ok(())
}
