//! Entry point for the clmpost binary.
//! Sets up logging and the thread pool, then dispatches the chosen subcommand.

use clap::Parser;
use clm_post::cli::{Args, Command};
use clm_post::evapotranspiration::compute_potevap;
use clm_post::masks::create_masks;
use clm_post::parallel::{get_parallel_info, ParallelConfig};
use clm_post::time_fix::fix_last_timestamp;
use clm_post::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    ParallelConfig::new(args.threads).setup_global_pool()?;
    get_parallel_info().log();

    match args.command {
        Command::Potevap { dir, reference } => {
            let output = compute_potevap(&dir, reference)?;
            info!(path = %output.display(), "process completed successfully");
        }
        Command::FixTimeLast { file } => {
            let outcome = fix_last_timestamp(&file)?;
            println!("{}", outcome);
        }
        Command::CreateMasks {
            input_path,
            inidir,
            input_file,
            extpar_file,
        } => {
            let files = create_masks(&input_path, &inidir, &input_file, &extpar_file)?;
            println!("File written: {}", files.input_mask.display());
            println!("File written: {}", files.output_mask.display());
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
