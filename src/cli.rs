use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Input atlas .json document (regions, tiles, exits, shops)
    pub atlas: PathBuf,
    /// Input items .json document (chests, bone piles, doors, ...)
    pub items: PathBuf,
    /// Output directory for the normalized documents
    pub output: PathBuf,
}
