//! Maintenance records and their checklists.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind of service performed, from a fixed list.
///
/// Stored as the label the browser form offered. An empty or unrecognised
/// label reads as [`ServiceType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceType {
    /// Oil service.
    OilService,
    /// Tire check.
    TireCheck,
    /// Brake check.
    BrakeCheck,
    /// Air conditioning check.
    AirConditioningCheck,
    /// Radiator check.
    RadiatorCheck,
    /// Battery check.
    BatteryCheck,
    /// Lights check.
    LightsCheck,
    /// Wipers check.
    WipersCheck,
    /// Air conditioning gas recharge.
    GasRecharge,
    /// Filter replacement.
    FilterReplacement,
    /// Engine check.
    EngineCheck,
    /// Anything else.
    Other,
}

impl ServiceType {
    /// Every service type, in the order forms offer them.
    pub const ALL: [ServiceType; 12] = [
        ServiceType::OilService,
        ServiceType::TireCheck,
        ServiceType::BrakeCheck,
        ServiceType::AirConditioningCheck,
        ServiceType::RadiatorCheck,
        ServiceType::BatteryCheck,
        ServiceType::LightsCheck,
        ServiceType::WipersCheck,
        ServiceType::GasRecharge,
        ServiceType::FilterReplacement,
        ServiceType::EngineCheck,
        ServiceType::Other,
    ];

    /// The stored label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::OilService => "שירות שמן",
            Self::TireCheck => "בדיקת צמיגים",
            Self::BrakeCheck => "בדיקת בלמים",
            Self::AirConditioningCheck => "בדיקת מזגן",
            Self::RadiatorCheck => "בדיקת רדיאטור",
            Self::BatteryCheck => "בדיקת סוללה",
            Self::LightsCheck => "בדיקת אורות",
            Self::WipersCheck => "בדיקת מגבים",
            Self::GasRecharge => "טעינת גז",
            Self::FilterReplacement => "החלפת פילטרים",
            Self::EngineCheck => "בדיקת מנוע",
            Self::Other => "אחר",
        }
    }

    /// The service type stored under `label`, or [`ServiceType::Other`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .unwrap_or(Self::Other)
    }
}

impl Serialize for ServiceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ServiceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::OilService => "oil service",
            Self::TireCheck => "tire check",
            Self::BrakeCheck => "brake check",
            Self::AirConditioningCheck => "air conditioning check",
            Self::RadiatorCheck => "radiator check",
            Self::BatteryCheck => "battery check",
            Self::LightsCheck => "lights check",
            Self::WipersCheck => "wipers check",
            Self::GasRecharge => "gas recharge",
            Self::FilterReplacement => "filter replacement",
            Self::EngineCheck => "engine check",
            Self::Other => "other",
        };
        f.pad(label)
    }
}

/// One checklist item of a maintenance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Id, unique within the owning record.
    pub id: String,
    /// What has to be done.
    pub description: String,
    /// Whether the task is done.
    pub completed: bool,
}

/// A logged maintenance action on a vehicle.
///
/// `vehicle_id` is a weak reference: the store does not check that the
/// vehicle exists. `vehicle_plate_number` is a snapshot taken when the
/// record was created and is not rewritten when the vehicle changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    /// Opaque unique id.
    pub id: String,
    /// Id of the serviced vehicle.
    pub vehicle_id: String,
    /// Plate number of the vehicle at creation time.
    pub vehicle_plate_number: String,
    /// Kind of service.
    pub service_type: ServiceType,
    /// Day of the service.
    pub date: NaiveDate,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Cost, if known. Never negative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Day the record was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<NaiveDate>,
    /// Whether the whole action is done.
    #[serde(default)]
    pub completed: bool,
    /// Checklist, in entry order.
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// File name of the attached receipt image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_image: Option<String>,
}

impl MaintenanceRecord {
    /// Flip the record's completed flag.
    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    /// Flip one task's completed flag. Returns `false` if no task has that id.
    pub fn toggle_task(&mut self, task_id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Whether the checklist has a task with `task_id`.
    #[must_use]
    pub fn has_task(&self, task_id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == task_id)
    }

    /// Number of tasks not yet done.
    #[must_use]
    pub fn open_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// The cost, counting an unknown cost as zero.
    #[must_use]
    pub fn cost_or_zero(&self) -> f64 {
        self.cost.unwrap_or(0.0)
    }
}
