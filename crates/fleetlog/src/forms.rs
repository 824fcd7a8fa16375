//! Form input and validation.
//!
//! Forms carry raw user input. Turning a form into a record either yields a
//! complete, valid record or a validation error naming the first offending
//! field; nothing is stored in the latter case.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{Error, Result};
use crate::ids::task_id;
use crate::links::barcode_from_link;
use crate::model::{
    parse_time, MaintenanceRecord, MaintenanceStatus, PublicReport, ReportStatus, ServiceType,
    Task, TripCategory, Vehicle,
};

/// Trimmed value of a required field.
fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(value.to_string())
}

/// Input for adding or editing a vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleForm {
    /// License plate.
    pub plate_number: String,
    /// Make and model.
    pub model: String,
    /// Vehicle identification number.
    pub vin: String,
    /// Barcode; the plate number is used when left empty.
    pub barcode: String,
    /// Maintenance status.
    pub maintenance_status: MaintenanceStatus,
}

impl VehicleForm {
    /// A form pre-filled with an existing vehicle, for editing.
    #[must_use]
    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            plate_number: vehicle.plate_number.clone(),
            model: vehicle.model.clone(),
            vin: vehicle.vin.clone(),
            barcode: vehicle.barcode.clone(),
            maintenance_status: vehicle.maintenance_status,
        }
    }

    /// Build a new vehicle.
    ///
    /// # Errors
    ///
    /// Returns a validation error if plate number, model or VIN is empty.
    pub fn create(&self, id: String, today: NaiveDate) -> Result<Vehicle> {
        let plate_number = required("plateNumber", &self.plate_number)?;
        let model = required("model", &self.model)?;
        let vin = required("vin", &self.vin)?;

        let barcode = match self.barcode.trim() {
            "" => plate_number.clone(),
            barcode => barcode.to_string(),
        };

        Ok(Vehicle {
            id,
            plate_number,
            model,
            vin,
            barcode,
            maintenance_status: self.maintenance_status,
            added_date: today,
        })
    }

    /// Apply the form to an existing vehicle, keeping its id and added date.
    ///
    /// # Errors
    ///
    /// Returns a validation error if plate number, model or VIN is empty.
    pub fn apply(&self, existing: &Vehicle) -> Result<Vehicle> {
        self.create(existing.id.clone(), existing.added_date)
    }
}

/// Input for logging a maintenance action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaintenanceForm {
    /// Id of the serviced vehicle.
    pub vehicle_id: String,
    /// Kind of service.
    pub service_type: Option<ServiceType>,
    /// Day of the service.
    pub date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: String,
    /// Cost as typed; empty for unknown.
    pub cost: String,
    /// One task per line.
    pub tasks: String,
    /// File name of the receipt image.
    pub receipt_image: Option<String>,
}

impl MaintenanceForm {
    /// Build a new record for one of `vehicles`.
    ///
    /// The vehicle's current plate number is copied into the record.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the vehicle is unknown, the service
    /// type or date is missing, or the cost is not a non-negative number.
    pub fn create(
        &self,
        vehicles: &[Vehicle],
        id: String,
        today: NaiveDate,
    ) -> Result<MaintenanceRecord> {
        let vehicle = vehicles
            .iter()
            .find(|v| v.id == self.vehicle_id.trim())
            .ok_or_else(|| Error::validation("vehicleId", "select a vehicle"))?;
        let service_type = self
            .service_type
            .ok_or_else(|| Error::validation("serviceType", "is required"))?;
        let date = self
            .date
            .ok_or_else(|| Error::validation("date", "is required"))?;
        let cost = self.parse_cost()?;

        let tasks = self
            .tasks
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(index, description)| Task {
                id: task_id(&id, index),
                description: description.to_string(),
                completed: false,
            })
            .collect();

        let receipt_image = self
            .receipt_image
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(MaintenanceRecord {
            id,
            vehicle_id: vehicle.id.clone(),
            vehicle_plate_number: vehicle.plate_number.clone(),
            service_type,
            date,
            notes: self.notes.trim().to_string(),
            cost,
            added_date: Some(today),
            completed: false,
            tasks,
            receipt_image,
        })
    }

    fn parse_cost(&self) -> Result<Option<f64>> {
        let text = self.cost.trim();
        if text.is_empty() {
            return Ok(None);
        }
        match text.parse::<f64>() {
            Ok(cost) if cost.is_finite() && cost >= 0.0 => Ok(Some(cost)),
            _ => Err(Error::validation("cost", "must be a non-negative number")),
        }
    }
}

/// Input of the public vehicle report form.
///
/// A form opened from a vehicle's QR link has its barcode locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicReportForm {
    barcode: String,
    barcode_locked: bool,
    /// File names of the attached photos.
    pub images: Vec<String>,
    /// Odometer reading as typed.
    pub mileage: String,
    /// Purpose of the trip.
    pub feature: Option<TripCategory>,
    /// Day of the trip.
    pub date: Option<NaiveDate>,
    /// Time of the trip, `HH:MM`.
    pub time: String,
    /// Name of the reporting driver.
    pub driver_name: String,
    /// Free-form notes.
    pub notes: String,
}

impl PublicReportForm {
    /// An empty form with date and time pre-filled.
    #[must_use]
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            barcode: String::new(),
            barcode_locked: false,
            images: Vec::new(),
            mileage: String::new(),
            feature: None,
            date: Some(date),
            time: time.format("%H:%M").to_string(),
            driver_name: String::new(),
            notes: String::new(),
        }
    }

    /// A form opened from a QR link. If the link carries a barcode, it is
    /// filled in and locked.
    #[must_use]
    pub fn from_link(link: &str, date: NaiveDate, time: NaiveTime) -> Self {
        let mut form = Self::new(date, time);
        if let Some(barcode) = barcode_from_link(link) {
            form.barcode = barcode;
            form.barcode_locked = true;
        }
        form
    }

    /// The barcode entered or taken from the link.
    #[must_use]
    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    /// Whether the barcode came from a QR link and cannot be changed.
    #[must_use]
    pub fn is_barcode_locked(&self) -> bool {
        self.barcode_locked
    }

    /// Enter a barcode.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the barcode is locked to another value.
    pub fn set_barcode(&mut self, barcode: &str) -> Result<()> {
        if self.barcode_locked && barcode.trim() != self.barcode {
            return Err(Error::validation(
                "barcode",
                "is fixed by the scanned code and cannot be changed",
            ));
        }
        self.barcode = barcode.trim().to_string();
        Ok(())
    }

    /// Build the report.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing, no image
    /// is attached, the mileage is not a whole non-negative number or the
    /// time is not `HH:MM`.
    pub fn submit(&self, id: String, submitted_at: DateTime<Utc>) -> Result<PublicReport> {
        let barcode = required("barcode", &self.barcode)?;

        let images: Vec<String> = self
            .images
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        if images.is_empty() {
            return Err(Error::validation("images", "attach at least one photo"));
        }

        let mileage = required("mileage", &self.mileage)?
            .parse::<u64>()
            .map_err(|_| Error::validation("mileage", "must be a whole non-negative number"))?;
        let feature = self
            .feature
            .ok_or_else(|| Error::validation("feature", "is required"))?;
        let date = self
            .date
            .ok_or_else(|| Error::validation("date", "is required"))?;
        let time = parse_time(&required("time", &self.time)?)
            .ok_or_else(|| Error::validation("time", "must be HH:MM"))?;
        let driver_name = required("driverName", &self.driver_name)?;

        Ok(PublicReport {
            id,
            barcode,
            images,
            mileage,
            feature,
            date,
            time,
            driver_name,
            notes: self.notes.trim().to_string(),
            submitted_at,
            status: ReportStatus::New,
        })
    }
}
