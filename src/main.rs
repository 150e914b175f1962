//! Neuroforge CLI — container recipes for neuroimaging software.

use clap::Parser;

fn main() {
    let cli = neuroforge::cli::Cli::parse();
    if let Err(e) = neuroforge::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
