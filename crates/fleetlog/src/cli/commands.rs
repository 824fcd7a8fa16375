//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::model::{MaintenanceStatus, ReportStatus, ServiceType, TripCategory};

/// Vehicle registry commands.
#[derive(Debug, Subcommand)]
pub enum VehicleCommand {
    /// List registered vehicles
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Register a vehicle
    Add {
        /// License plate number
        #[arg(long)]
        plate: String,

        /// Make and model
        #[arg(long)]
        model: String,

        /// Vehicle identification number
        #[arg(long)]
        vin: String,

        /// Barcode (defaults to the plate number)
        #[arg(long)]
        barcode: Option<String>,

        /// Maintenance status
        #[arg(long, value_enum, default_value = "ok")]
        status: VehicleStatusArg,
    },

    /// Change a vehicle's details
    Edit {
        /// Vehicle id
        id: String,

        /// New license plate number
        #[arg(long)]
        plate: Option<String>,

        /// New make and model
        #[arg(long)]
        model: Option<String>,

        /// New vehicle identification number
        #[arg(long)]
        vin: Option<String>,

        /// New barcode
        #[arg(long)]
        barcode: Option<String>,

        /// New maintenance status
        #[arg(long, value_enum)]
        status: Option<VehicleStatusArg>,
    },

    /// Remove a vehicle
    Remove {
        /// Vehicle id
        id: String,
    },

    /// Set a vehicle's maintenance status
    SetStatus {
        /// Vehicle id
        id: String,

        /// New status
        #[arg(value_enum)]
        status: VehicleStatusArg,
    },
}

/// Maintenance log commands.
#[derive(Debug, Subcommand)]
pub enum MaintenanceCommand {
    /// List maintenance records
    List {
        /// Only records of this vehicle
        #[arg(long, value_name = "VEHICLE_ID")]
        vehicle: Option<String>,

        /// Only records on this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Log a maintenance action
    Add {
        /// Id of the serviced vehicle
        #[arg(long, value_name = "VEHICLE_ID")]
        vehicle: String,

        /// Kind of service
        #[arg(long, value_enum)]
        service: ServiceTypeArg,

        /// Day of the service (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Cost
        #[arg(long)]
        cost: Option<String>,

        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,

        /// A checklist task (repeatable)
        #[arg(long = "task", value_name = "DESCRIPTION")]
        tasks: Vec<String>,

        /// File name of the receipt image
        #[arg(long, value_name = "FILE")]
        receipt: Option<String>,
    },

    /// Toggle whether a record is completed
    Complete {
        /// Record id
        id: String,
    },

    /// Toggle whether a task of a record is completed
    ToggleTask {
        /// Record id
        id: String,

        /// Task id
        task_id: String,
    },

    /// Remove a maintenance record
    Remove {
        /// Record id
        id: String,
    },
}

/// Public report commands.
#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// Submit a vehicle report
    Submit(SubmitReport),

    /// List public reports
    List {
        /// Search driver name, barcode and trip category
        #[arg(short, long)]
        search: Option<String>,

        /// Only reports in this state
        #[arg(long, value_enum)]
        status: Option<ReportStatusArg>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Set the review state of a report
    SetStatus {
        /// Report id
        id: String,

        /// New state
        #[arg(value_enum)]
        status: ReportStatusArg,
    },

    /// Remove a report
    Remove {
        /// Report id
        id: String,
    },
}

/// Arguments of `report submit`.
#[derive(Debug, Args)]
pub struct SubmitReport {
    /// Link scanned from the vehicle's QR code; fixes the barcode
    #[arg(long)]
    pub link: Option<String>,

    /// Barcode of the vehicle
    #[arg(long)]
    pub barcode: Option<String>,

    /// Odometer reading in kilometres
    #[arg(long)]
    pub mileage: String,

    /// Purpose of the trip
    #[arg(long, value_enum)]
    pub feature: TripCategoryArg,

    /// Day of the trip (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Time of the trip, HH:MM (defaults to now)
    #[arg(long)]
    pub time: Option<String>,

    /// Name of the driver
    #[arg(long)]
    pub driver: String,

    /// Free-form notes
    #[arg(long, default_value = "")]
    pub notes: String,

    /// File name of a photo (repeatable)
    #[arg(long = "image", value_name = "FILE")]
    pub images: Vec<String>,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Costs command arguments.
#[derive(Debug, Args)]
pub struct CostsCommand {
    /// Only costs of this vehicle
    #[arg(long, value_name = "VEHICLE_ID")]
    pub vehicle: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// QR command arguments.
#[derive(Debug, Args)]
pub struct QrCommand {
    /// Vehicle id
    pub vehicle_id: String,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Vehicle maintenance status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VehicleStatusArg {
    /// In order
    Ok,
    /// Needs service
    NeedsService,
}

impl From<VehicleStatusArg> for MaintenanceStatus {
    fn from(arg: VehicleStatusArg) -> Self {
        match arg {
            VehicleStatusArg::Ok => Self::Ok,
            VehicleStatusArg::NeedsService => Self::NeedsService,
        }
    }
}

/// Service type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceTypeArg {
    /// Oil service
    Oil,
    /// Tire check
    Tires,
    /// Brake check
    Brakes,
    /// Air conditioning check
    AirConditioning,
    /// Radiator check
    Radiator,
    /// Battery check
    Battery,
    /// Lights check
    Lights,
    /// Wipers check
    Wipers,
    /// Air conditioning gas recharge
    Gas,
    /// Filter replacement
    Filters,
    /// Engine check
    Engine,
    /// Anything else
    Other,
}

impl From<ServiceTypeArg> for ServiceType {
    fn from(arg: ServiceTypeArg) -> Self {
        match arg {
            ServiceTypeArg::Oil => Self::OilService,
            ServiceTypeArg::Tires => Self::TireCheck,
            ServiceTypeArg::Brakes => Self::BrakeCheck,
            ServiceTypeArg::AirConditioning => Self::AirConditioningCheck,
            ServiceTypeArg::Radiator => Self::RadiatorCheck,
            ServiceTypeArg::Battery => Self::BatteryCheck,
            ServiceTypeArg::Lights => Self::LightsCheck,
            ServiceTypeArg::Wipers => Self::WipersCheck,
            ServiceTypeArg::Gas => Self::GasRecharge,
            ServiceTypeArg::Filters => Self::FilterReplacement,
            ServiceTypeArg::Engine => Self::EngineCheck,
            ServiceTypeArg::Other => Self::Other,
        }
    }
}

/// Trip category argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TripCategoryArg {
    /// Regular trip
    Regular,
    /// Driving guests
    Guests,
    /// Urgent delivery
    Urgent,
    /// Special project
    Project,
    /// Driving lesson
    Training,
    /// Routine maintenance run
    Maintenance,
    /// Anything else
    Other,
}

impl From<TripCategoryArg> for TripCategory {
    fn from(arg: TripCategoryArg) -> Self {
        match arg {
            TripCategoryArg::Regular => Self::RegularTrip,
            TripCategoryArg::Guests => Self::GuestShuttle,
            TripCategoryArg::Urgent => Self::UrgentDelivery,
            TripCategoryArg::Project => Self::SpecialProject,
            TripCategoryArg::Training => Self::DrivingTraining,
            TripCategoryArg::Maintenance => Self::RoutineMaintenance,
            TripCategoryArg::Other => Self::Other,
        }
    }
}

/// Report review state argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportStatusArg {
    /// Not looked at yet
    New,
    /// Looked at
    Reviewed,
    /// Acted upon
    Processed,
}

impl From<ReportStatusArg> for ReportStatus {
    fn from(arg: ReportStatusArg) -> Self {
        match arg {
            ReportStatusArg::New => Self::New,
            ReportStatusArg::Reviewed => Self::Reviewed,
            ReportStatusArg::Processed => Self::Processed,
        }
    }
}
