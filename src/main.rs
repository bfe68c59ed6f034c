//! # Voxel Streaming Demo Entry Point
//!
//! Runs a headless streaming session through the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    voxel_streaming::run(config_path.as_deref())
}
