use std::path::PathBuf;

use clap::Parser;
use nu_ansi_term::Color;

use dotconf_cli::{CommandResult, Commands};
use dotconf_store::ConfigStore;

/// dotconf - inspect and edit dotted-path config files
#[derive(Parser, Debug)]
#[command(name = "dotconf")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to operate on
    #[arg(short, long, env = "DOTCONF_FILE")]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let store = match ConfigStore::open(&args.file) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("{} {}", Color::Red.paint("error:"), e);
            std::process::exit(2);
        }
    };

    match dotconf_cli::run(&store, &args.command) {
        CommandResult::Ok { display } => {
            if let Some(display) = display {
                println!("{}", display);
            }
        }
        CommandResult::Error(message) => {
            eprintln!("{} {}", Color::Red.paint("error:"), message);
            std::process::exit(1);
        }
    }
}
