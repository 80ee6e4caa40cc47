//! # Wave Grid Application (Binary)
//!
//! Main executable entry point.

fn main() -> anyhow::Result<()> {
    wave_grid_app::main()
}
