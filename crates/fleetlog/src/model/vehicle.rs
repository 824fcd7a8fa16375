//! Vehicles in the fleet registry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a vehicle is fit for use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaintenanceStatus {
    /// The vehicle is in order and available.
    #[default]
    #[serde(rename = "תקין", alias = "OK")]
    Ok,
    /// The vehicle needs service before use.
    #[serde(rename = "דורש טיפול", alias = "NeedsService")]
    NeedsService,
}

impl MaintenanceStatus {
    /// Whether a vehicle with this status counts as available.
    #[must_use]
    pub fn is_available(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::NeedsService => write!(f, "needs service"),
        }
    }
}

/// A vehicle in the fleet registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Opaque unique id.
    pub id: String,
    /// License plate, e.g. `123-45-678`. Expected unique, not enforced.
    pub plate_number: String,
    /// Make and model.
    pub model: String,
    /// Vehicle identification number.
    pub vin: String,
    /// Barcode printed for the vehicle; public reports reference it.
    pub barcode: String,
    /// Current maintenance status.
    pub maintenance_status: MaintenanceStatus,
    /// Day the vehicle was registered.
    pub added_date: NaiveDate,
}

impl Vehicle {
    /// Whether this vehicle's barcode matches, ignoring surrounding whitespace.
    #[must_use]
    pub fn has_barcode(&self, barcode: &str) -> bool {
        self.barcode == barcode.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vehicle {
        Vehicle {
            id: "1".to_string(),
            plate_number: "123-45-678".to_string(),
            model: "Toyota Corolla".to_string(),
            vin: "JT2BF28K0X0123456".to_string(),
            barcode: "BAR001".to_string(),
            maintenance_status: MaintenanceStatus::Ok,
            added_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_vehicle_wire_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["plateNumber"], "123-45-678");
        assert_eq!(json["maintenanceStatus"], "תקין");
        assert_eq!(json["addedDate"], "2024-01-15");
    }

    #[test]
    fn test_status_reads_browser_and_english_values() {
        let hebrew: MaintenanceStatus = serde_json::from_str("\"דורש טיפול\"").unwrap();
        let english: MaintenanceStatus = serde_json::from_str("\"NeedsService\"").unwrap();
        assert_eq!(hebrew, MaintenanceStatus::NeedsService);
        assert_eq!(english, MaintenanceStatus::NeedsService);

        let ok: MaintenanceStatus = serde_json::from_str("\"OK\"").unwrap();
        assert_eq!(ok, MaintenanceStatus::Ok);
    }

    #[test]
    fn test_status_availability() {
        assert!(MaintenanceStatus::Ok.is_available());
        assert!(!MaintenanceStatus::NeedsService.is_available());
        assert_eq!(MaintenanceStatus::default(), MaintenanceStatus::Ok);
    }

    #[test]
    fn test_has_barcode() {
        let vehicle = sample();
        assert!(vehicle.has_barcode("BAR001"));
        assert!(vehicle.has_barcode(" BAR001 "));
        assert!(!vehicle.has_barcode("BAR002"));
    }
}
