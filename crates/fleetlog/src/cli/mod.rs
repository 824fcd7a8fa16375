//! Command-line interface for fleetlog.
//!
//! This module provides the CLI structure for the `fleetctl` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, CostsCommand, MaintenanceCommand, QrCommand, ReportCommand,
    ReportStatusArg, ServiceTypeArg, StatsCommand, StatusCommand, SubmitReport,
    TripCategoryArg, VehicleCommand, VehicleStatusArg,
};

/// fleetctl - Manage a vehicle fleet from the command line
///
/// Keeps the vehicle registry, the maintenance log and drivers' trip
/// reports in a local database.
#[derive(Debug, Parser)]
#[command(name = "fleetctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the database, overriding the configuration
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the vehicle registry
    #[command(subcommand)]
    Vehicle(VehicleCommand),

    /// Manage the maintenance log
    #[command(subcommand)]
    Maintenance(MaintenanceCommand),

    /// Submit and review public reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// Show dashboard numbers
    Stats(StatsCommand),

    /// Show maintenance costs
    Costs(CostsCommand),

    /// Print the public form link for a vehicle's QR code
    Qr(QrCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
