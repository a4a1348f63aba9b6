use std::error::Error;
use std::io;
use std::path::PathBuf;
use clap::Parser;
use log::{info, warn};
use crate::console::Console;
use crate::transaction_store::TransactionStore;

mod console;
mod error;
mod file_handler;
mod transaction;
mod transaction_store;

/// Console budget tracker that keeps its transactions in a flat text file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File the transactions are loaded from and saved to.
    #[arg(long, short, env = "BUDGET_TRACKER_FILE", default_value = "transactions.txt")]
    file: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut store = TransactionStore::new(args.file);
    let summary = store.load()?;
    if summary.skipped > 0 {
        warn!("Skipped {} malformed lines in {}", summary.skipped, store.path().display());
    }
    info!("Loaded {} transactions from {}", summary.loaded, store.path().display());

    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(&mut store, stdin.lock(), stdout.lock()).run()?;
    Ok(())
}
