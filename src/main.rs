use std::io;
use std::process;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sapling::cli::{self, Cli};
use sapling::config::Config;
use sapling::home;
use sapling::storage::Storage;

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("SAPLING_LOG").unwrap_or_else(|_| "sapling=warn".into()),
        )
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let home = home::resolve_home(cli.home()).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let config = match Config::load(&home) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }
    };

    let storage = match Storage::new(home::paths_dir(&home)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(cli, &config, &storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
