use std::io::Write;

use log::LevelFilter;

/// Installs the global logger. Lines look like `2026-01-01 12:00:00 - INFO - message`.
/// `RUST_LOG`, when set, overrides `level`.
pub fn init(level: LevelFilter)
{
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .parse_default_env()
        .init();
}
