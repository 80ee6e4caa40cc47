// Main entry point that forwards to the wave-grid-app binary
fn main() {
    // Exit with the same code as the app
    std::process::exit(match wave_grid_app::main() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    });
}
