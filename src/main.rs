use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use notedeck::{App, Cli, Config, FileSlotStore, Result, Session};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let slots = FileSlotStore::open(&config.data_dir)?;
    info!("Using data directory {}", slots.dir().display());

    let session = Session::open(slots);
    let mut app = App::new(session, config, cli.verbose);
    app.run(cli.command)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
