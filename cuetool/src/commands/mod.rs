mod convert;
mod inspect;
mod preview;

pub use convert::Convert;
pub use inspect::Inspect;
pub use preview::Preview;

use clap::{Parser, Subcommand};

/// Parse, convert and inspect caption/subtitle files.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Convert(Convert),
    Inspect(Inspect),
    Preview(Preview),
}
