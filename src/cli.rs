use clap::{Parser, Subcommand};
use presence_card::TransportKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "presence-card", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file path
    #[arg(short, long, value_name = "FILE")]
    pub config_path: Option<String>,

    /// Tracked user id (overrides the config file)
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Transport strategy (overrides the config file)
    #[arg(short, long, value_enum)]
    pub transport: Option<TransportKind>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the widget (default)
    Run,

    /// Generate sample configuration
    ConfigSample {
        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
