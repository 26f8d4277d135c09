use std::path::PathBuf;

use clap::Parser;

use ladder_vm::cli;
use ladder_vm::logger;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "laddervm", about = "Ladder logic stack machine")]
struct Args {
    /// Turn on verbose logging. Repeat to increase verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Sets the logging to write to a file.
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Selects the subcommand.
    #[command(subcommand)]
    action: Action,
}

#[derive(clap::Subcommand, Debug)]
enum Action {
    /// Compiles and runs the bundled motor start/stop program.
    Demo {
        /// Run N scans then stop (default: continuous until Ctrl+C).
        #[arg(long)]
        scans: Option<u64>,

        /// Address of an input (X) to hold ON. Repeat for several inputs.
        #[arg(long = "input", value_name = "ADDR")]
        inputs: Vec<u32>,

        /// Print the compiled command listing before running.
        #[arg(long)]
        listing: bool,
    },
    /// Prints the version number of the virtual machine.
    Version,
}

pub fn main() -> Result<(), String> {
    let args = Args::parse();

    logger::configure(args.verbose, args.log_file)?;

    match args.action {
        Action::Demo {
            scans,
            inputs,
            listing,
        } => cli::demo(scans, &inputs, listing),
        Action::Version => {
            println!("laddervm version {VERSION}");
            Ok(())
        }
    }
}
