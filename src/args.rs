use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    pub config: Option<PathBuf>,

    /// List available cameras and exit
    #[arg(long)]
    pub list: bool,
}
