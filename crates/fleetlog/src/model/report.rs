//! Drivers' trip reports filed through the public form.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Review state of a public report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Submitted, not looked at yet.
    #[default]
    New,
    /// Looked at by fleet staff.
    Reviewed,
    /// Acted upon.
    Processed,
}

impl ReportStatus {
    /// Every status, in workflow order.
    pub const ALL: [ReportStatus; 3] = [
        ReportStatus::New,
        ReportStatus::Reviewed,
        ReportStatus::Processed,
    ];
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Reviewed => write!(f, "reviewed"),
            Self::Processed => write!(f, "processed"),
        }
    }
}

/// Purpose of the trip a public report was filed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripCategory {
    /// Regular trip.
    #[serde(rename = "נסיעה רגילה")]
    RegularTrip,
    /// Driving guests.
    #[serde(rename = "הסעת אורחים")]
    GuestShuttle,
    /// Urgent delivery.
    #[serde(rename = "משלוח דחוף")]
    UrgentDelivery,
    /// Special project.
    #[serde(rename = "פרויקט מיוחד")]
    SpecialProject,
    /// Driving lesson.
    #[serde(rename = "אימון נהיגה")]
    DrivingTraining,
    /// Routine maintenance run.
    #[serde(rename = "תחזוקה שוטפת")]
    RoutineMaintenance,
    /// Anything else.
    #[serde(rename = "אחר")]
    Other,
}

impl TripCategory {
    /// Every category, in the order the public form offers them.
    pub const ALL: [TripCategory; 7] = [
        TripCategory::RegularTrip,
        TripCategory::GuestShuttle,
        TripCategory::UrgentDelivery,
        TripCategory::SpecialProject,
        TripCategory::DrivingTraining,
        TripCategory::RoutineMaintenance,
        TripCategory::Other,
    ];

    /// The stored label, as the browser form showed it.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::RegularTrip => "נסיעה רגילה",
            Self::GuestShuttle => "הסעת אורחים",
            Self::UrgentDelivery => "משלוח דחוף",
            Self::SpecialProject => "פרויקט מיוחד",
            Self::DrivingTraining => "אימון נהיגה",
            Self::RoutineMaintenance => "תחזוקה שוטפת",
            Self::Other => "אחר",
        }
    }
}

impl std::fmt::Display for TripCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::RegularTrip => "regular trip",
            Self::GuestShuttle => "guest shuttle",
            Self::UrgentDelivery => "urgent delivery",
            Self::SpecialProject => "special project",
            Self::DrivingTraining => "driving training",
            Self::RoutineMaintenance => "routine maintenance",
            Self::Other => "other",
        };
        f.pad(label)
    }
}

/// A vehicle condition report filed by a driver through the public form.
///
/// `barcode` is a weak reference to [`crate::model::Vehicle::barcode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPublicReport")]
pub struct PublicReport {
    /// Opaque unique id.
    pub id: String,
    /// Barcode of the reported vehicle.
    pub barcode: String,
    /// File names of the attached photos.
    pub images: Vec<String>,
    /// Odometer reading in kilometres.
    pub mileage: u64,
    /// Purpose of the trip.
    pub feature: TripCategory,
    /// Day of the trip.
    pub date: NaiveDate,
    /// Time of the trip.
    #[serde(serialize_with = "serialize_time")]
    pub time: NaiveTime,
    /// Name of the reporting driver.
    pub driver_name: String,
    /// Free-form notes.
    pub notes: String,
    /// When the form was submitted.
    pub submitted_at: DateTime<Utc>,
    /// Review state.
    pub status: ReportStatus,
}

impl PublicReport {
    /// Case-insensitive match of `term` against driver name, barcode and
    /// trip category. An empty term matches everything.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.driver_name.to_lowercase().contains(&term)
            || self.barcode.to_lowercase().contains(&term)
            || self.feature.label().contains(&term)
            || self.feature.to_string().contains(&term)
    }
}

/// Parse a `HH:MM` or `HH:MM:SS` time of day.
pub(crate) fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

fn serialize_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    let formatted = if time.second() == 0 && time.nanosecond() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    };
    serializer.serialize_str(&formatted)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MileageValue {
    Number(u64),
    Decimal(f64),
    Text(String),
}

impl MileageValue {
    /// Whole kilometres. The browser form stored the number input as typed,
    /// so decimals are rounded.
    fn kilometres(self) -> Result<u64, String> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Decimal(value) => {
                whole_kilometres(value).ok_or_else(|| format!("invalid mileage: {value}"))
            }
            Self::Text(text) => {
                let trimmed = text.trim();
                trimmed
                    .parse::<u64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(whole_kilometres))
                    .ok_or_else(|| format!("invalid mileage: {text}"))
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_kilometres(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value < u64::MAX as f64).then(|| value.round() as u64)
}

/// Every shape a public report has been stored in: the current one, the
/// browser form's single `image` field, and legacy `publicFormEntries`
/// items keyed by `timestamp` and `distance`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPublicReport {
    id: String,
    barcode: String,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default)]
    image: Option<String>,
    #[serde(alias = "distance")]
    mileage: MileageValue,
    feature: TripCategory,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    time: Option<String>,
    driver_name: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(alias = "timestamp")]
    submitted_at: DateTime<Utc>,
    #[serde(default)]
    status: ReportStatus,
}

impl TryFrom<RawPublicReport> for PublicReport {
    type Error = String;

    fn try_from(raw: RawPublicReport) -> Result<Self, Self::Error> {
        let mileage = raw.mileage.kilometres()?;

        let time = match raw.time {
            Some(text) => parse_time(&text).ok_or_else(|| format!("invalid time: {text}"))?,
            None => {
                let at = raw.submitted_at.time();
                NaiveTime::from_hms_opt(at.hour(), at.minute(), 0)
                    .ok_or_else(|| "invalid submission time".to_string())?
            }
        };

        let images = match (raw.images, raw.image) {
            (Some(images), _) => images,
            (None, Some(image)) => vec![image],
            (None, None) => Vec::new(),
        };

        Ok(Self {
            id: raw.id,
            barcode: raw.barcode,
            images,
            mileage,
            feature: raw.feature,
            date: raw.date.unwrap_or_else(|| raw.submitted_at.date_naive()),
            time,
            driver_name: raw.driver_name,
            notes: raw.notes.unwrap_or_default(),
            submitted_at: raw.submitted_at,
            status: raw.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_browser_form_shape() {
        let json = r#"{
            "id": "1718000000000",
            "barcode": "BAR001",
            "image": "front.jpg",
            "mileage": "123456",
            "feature": "משלוח דחוף",
            "date": "2024-06-10",
            "time": "08:15",
            "driverName": "Dana",
            "notes": "",
            "submittedAt": "2024-06-10T08:20:31.000Z"
        }"#;
        let report: PublicReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.images, vec!["front.jpg".to_string()]);
        assert_eq!(report.mileage, 123_456);
        assert_eq!(report.feature, TripCategory::UrgentDelivery);
        assert_eq!(report.time, NaiveTime::from_hms_opt(8, 15, 0).unwrap());
        assert_eq!(report.status, ReportStatus::New);
    }

    #[test]
    fn test_reads_null_image_as_empty() {
        let json = r#"{
            "id": "1",
            "barcode": "BAR001",
            "image": null,
            "mileage": 10,
            "feature": "אחר",
            "date": "2024-06-10",
            "time": "08:15",
            "driverName": "Dana",
            "submittedAt": "2024-06-10T08:20:31Z",
            "status": "reviewed"
        }"#;
        let report: PublicReport = serde_json::from_str(json).unwrap();
        assert!(report.images.is_empty());
        assert!(report.notes.is_empty());
        assert_eq!(report.status, ReportStatus::Reviewed);
    }

    #[test]
    fn test_reads_legacy_entry() {
        let json = r#"{
            "id": "7",
            "timestamp": "2023-11-02T14:45:09Z",
            "driverName": "Avi",
            "barcode": "BAR002",
            "distance": "98000",
            "feature": "נסיעה רגילה",
            "project": "x",
            "trip": "y",
            "images": ["a.png", "b.png"],
            "status": "processed"
        }"#;
        let report: PublicReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.mileage, 98_000);
        assert_eq!(report.images.len(), 2);
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2023, 11, 2).unwrap());
        assert_eq!(report.time, NaiveTime::from_hms_opt(14, 45, 0).unwrap());
        assert_eq!(report.status, ReportStatus::Processed);
    }

    #[test]
    fn test_rejects_non_numeric_mileage() {
        let json = r#"{
            "id": "1",
            "barcode": "BAR001",
            "mileage": "far",
            "feature": "אחר",
            "driverName": "Dana",
            "submittedAt": "2024-06-10T08:20:31Z"
        }"#;
        let err = serde_json::from_str::<PublicReport>(json).unwrap_err();
        assert!(err.to_string().contains("invalid mileage"));
    }

    #[test]
    fn test_decimal_mileage_is_rounded() {
        for (mileage, expected) in [(r#""1500.5""#, 1501), ("1500.5", 1501), (r#"" 1499.6 ""#, 1500)] {
            let json = format!(
                r#"{{
                    "id": "2",
                    "barcode": "BAR002",
                    "images": ["dash.jpg"],
                    "mileage": {mileage},
                    "feature": "נסיעה רגילה",
                    "date": "2024-06-10",
                    "time": "08:15",
                    "driverName": "Dana",
                    "submittedAt": "2024-06-10T08:20:31Z"
                }}"#
            );
            let report: PublicReport = serde_json::from_str(&json).unwrap();
            assert_eq!(report.mileage, expected, "mileage {mileage}");
        }
    }

    #[test]
    fn test_rejects_negative_mileage() {
        let json = r#"{
            "id": "1",
            "barcode": "BAR001",
            "mileage": "-3",
            "feature": "אחר",
            "driverName": "Dana",
            "submittedAt": "2024-06-10T08:20:31Z"
        }"#;
        assert!(serde_json::from_str::<PublicReport>(json).is_err());
    }

    #[test]
    fn test_writes_current_shape() {
        let report = PublicReport {
            id: "1".to_string(),
            barcode: "BAR001".to_string(),
            images: vec!["front.jpg".to_string()],
            mileage: 5,
            feature: TripCategory::Other,
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            time: NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
            driver_name: "Dana".to_string(),
            notes: String::new(),
            submitted_at: DateTime::parse_from_rfc3339("2024-06-10T09:06:00Z")
                .unwrap()
                .with_timezone(&Utc),
            status: ReportStatus::New,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["time"], "09:05");
        assert_eq!(json["driverName"], "Dana");
        assert_eq!(json["images"][0], "front.jpg");
        assert!(json.get("image").is_none());

        let back: PublicReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_matches_search() {
        let json = r#"{
            "id": "1",
            "barcode": "BAR001",
            "mileage": 1,
            "feature": "הסעת אורחים",
            "date": "2024-06-10",
            "time": "08:15",
            "driverName": "Dana Levi",
            "submittedAt": "2024-06-10T08:20:31Z"
        }"#;
        let report: PublicReport = serde_json::from_str(json).unwrap();
        assert!(report.matches_search(""));
        assert!(report.matches_search("dana"));
        assert!(report.matches_search("bar0"));
        assert!(report.matches_search("אורחים"));
        assert!(report.matches_search("shuttle"));
        assert!(!report.matches_search("BAR002"));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("07:30"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_time("07:30:15"), NaiveTime::from_hms_opt(7, 30, 15));
        assert_eq!(parse_time("7pm"), None);
    }
}
