use std::path::PathBuf;

use anyhow::Context;
use log::info;

use jersey3d::ViewerConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ViewerConfig::load_or_default(config_path.as_deref()).with_context(|| {
        match &config_path {
            Some(path) => format!("Invalid viewer config {}", path.display()),
            None => "Invalid built-in viewer config".to_string(),
        }
    })?;

    match &config_path {
        Some(path) => info!("Using config {}", path.display()),
        None => info!("Using built-in defaults"),
    }

    jersey3d::run(config)
}
