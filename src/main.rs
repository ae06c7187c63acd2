use clap::Parser;
use fundchat::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
