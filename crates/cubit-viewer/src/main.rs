//! Voxel viewer: a few generated chunks drawn with the instanced pipeline.
//!
//! WASD/Space/LeftShift move, right-drag looks around, scroll moves along the
//! view, left click removes the block under the cursor.

mod config;
mod controller;
mod viewer;

use cubit_engine::device::GpuInit;
use cubit_engine::logging::{init_logging, LoggingConfig};
use cubit_engine::window::{Runtime, RuntimeConfig};

use crate::config::ViewerConfig;
use crate::viewer::Viewer;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = ViewerConfig::from_env();
    log::info!("starting cubit viewer: {config:?}");

    Runtime::run(
        RuntimeConfig {
            title: "cubit".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        Viewer::new(config),
    )
}
