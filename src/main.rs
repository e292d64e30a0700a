use clap::Parser;
use env_logger::Env;
use fastx_qual_stats::{cli, commands};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = cli::Args::parse();

    if let Err(e) = commands::qual_stats::run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
