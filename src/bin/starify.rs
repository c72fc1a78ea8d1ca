use std::path::PathBuf;
use std::process;

use clap::Parser;

use starify::output;

#[derive(Parser)]
#[command(
    name = "starify",
    version,
    about = "Uppercase letters, expand each digit d into d '*' bytes, and append a marker-count footer"
)]
struct Cli {
    /// File to transform
    input: PathBuf,

    /// Destination file (created or truncated; must not be INPUT)
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = output::run(&cli.input, &cli.output) {
        eprintln!("starify: {e}");
        process::exit(1);
    }
}
