//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Lumis portal installer - unpacks and wires the portal, its database and
/// an application server
#[derive(Parser, Debug)]
#[command(name = "lpi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the lpi.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install the portal, its database and the application server
    Install(InstallArgs),

    /// Write a sample configuration and stop
    Sample(SampleArgs),

    /// List the database and server types
    Variants,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Stop at the first failed step and exit with status 3
    #[arg(long)]
    pub strict: bool,

    /// Override a configuration key (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Install home (same as --set install.home=PATH)
    #[arg(long)]
    pub home: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Output file path
    #[arg(short, long, default_value = "lpi.yaml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}
