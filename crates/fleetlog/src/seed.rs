//! Sample data for collections loaded for the first time.
//!
//! Whether a collection is seeded is configuration ([`crate::config::SeedConfig`]).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::model::{
    MaintenanceRecord, MaintenanceStatus, PublicReport, ReportStatus, ServiceType, Task,
    TripCategory, Vehicle,
};

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Two vehicles: one in order, one needing service.
#[must_use]
pub fn vehicles() -> Vec<Vehicle> {
    vec![
        Vehicle {
            id: "1".to_string(),
            plate_number: "123-45-678".to_string(),
            model: "טויוטה קורולה".to_string(),
            vin: "JT2BF28K0X0123456".to_string(),
            barcode: "BAR001".to_string(),
            maintenance_status: MaintenanceStatus::Ok,
            added_date: day(2024, 1, 15),
        },
        Vehicle {
            id: "2".to_string(),
            plate_number: "987-65-432".to_string(),
            model: "הונדה סיוויק".to_string(),
            vin: "1HGBH41JXMN123456".to_string(),
            barcode: "BAR002".to_string(),
            maintenance_status: MaintenanceStatus::NeedsService,
            added_date: day(2024, 2, 10),
        },
    ]
}

/// A finished oil service on the first vehicle and an open brake check on
/// the second.
#[must_use]
pub fn maintenance_records() -> Vec<MaintenanceRecord> {
    vec![
        MaintenanceRecord {
            id: "1".to_string(),
            vehicle_id: "1".to_string(),
            vehicle_plate_number: "123-45-678".to_string(),
            service_type: ServiceType::OilService,
            date: day(2024, 3, 1),
            notes: String::new(),
            cost: Some(250.0),
            added_date: Some(day(2024, 3, 1)),
            completed: true,
            tasks: vec![
                Task {
                    id: "1-1".to_string(),
                    description: "החלפת שמן מנוע".to_string(),
                    completed: true,
                },
                Task {
                    id: "1-2".to_string(),
                    description: "החלפת מסנן שמן".to_string(),
                    completed: true,
                },
            ],
            receipt_image: None,
        },
        MaintenanceRecord {
            id: "2".to_string(),
            vehicle_id: "2".to_string(),
            vehicle_plate_number: "987-65-432".to_string(),
            service_type: ServiceType::BrakeCheck,
            date: day(2024, 3, 12),
            notes: "רעש בבלימה".to_string(),
            cost: None,
            added_date: Some(day(2024, 3, 10)),
            completed: false,
            tasks: vec![Task {
                id: "2-1".to_string(),
                description: "בדיקת רפידות".to_string(),
                completed: false,
            }],
            receipt_image: None,
        },
    ]
}

/// One unreviewed report for the vehicle needing service.
#[must_use]
pub fn public_reports() -> Vec<PublicReport> {
    let submitted_at = DateTime::parse_from_rfc3339("2024-03-11T07:42:00Z")
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_default();

    vec![PublicReport {
        id: "1".to_string(),
        barcode: "BAR002".to_string(),
        images: vec!["front.jpg".to_string()],
        mileage: 84_210,
        feature: TripCategory::RegularTrip,
        date: day(2024, 3, 11),
        time: NaiveTime::from_hms_opt(7, 30, 0).unwrap_or_default(),
        driver_name: "דנה".to_string(),
        notes: "רעש בבלמים".to_string(),
        submitted_at,
        status: ReportStatus::New,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_vehicles() {
        let vehicles = vehicles();
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].plate_number, "123-45-678");
        assert_eq!(vehicles[0].barcode, "BAR001");
        assert!(vehicles[0].maintenance_status.is_available());
        assert_eq!(vehicles[1].barcode, "BAR002");
        assert_eq!(vehicles[1].maintenance_status, MaintenanceStatus::NeedsService);
    }

    #[test]
    fn test_sample_records_reference_sample_vehicles() {
        let vehicles = vehicles();
        for record in maintenance_records() {
            let vehicle = vehicles
                .iter()
                .find(|v| v.id == record.vehicle_id)
                .expect("record references a sample vehicle");
            assert_eq!(vehicle.plate_number, record.vehicle_plate_number);
        }
    }

    #[test]
    fn test_sample_report_references_sample_vehicle() {
        let vehicles = vehicles();
        for report in public_reports() {
            assert!(vehicles.iter().any(|v| v.has_barcode(&report.barcode)));
            assert!(!report.images.is_empty());
        }
    }
}
