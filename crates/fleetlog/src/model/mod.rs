//! Entity types persisted by the store.
//!
//! Each entity lives in one named [`Collection`], stored as a JSON array
//! under the collection's key. Field names on the wire are camelCase and
//! enum values are the strings the browser application wrote, so existing
//! data loads unchanged.

mod maintenance;
mod report;
mod vehicle;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use maintenance::{MaintenanceRecord, ServiceType, Task};
pub(crate) use report::parse_time;
pub use report::{PublicReport, ReportStatus, TripCategory};
pub use vehicle::{MaintenanceStatus, Vehicle};

/// A named collection of records in key-value storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// The vehicle registry.
    Vehicles,
    /// The maintenance log.
    MaintenanceRecords,
    /// Reports submitted through the public form.
    PublicReports,
}

impl Collection {
    /// Every collection, in the order views list them.
    pub const ALL: [Collection; 3] = [
        Collection::Vehicles,
        Collection::MaintenanceRecords,
        Collection::PublicReports,
    ];

    /// Storage key holding this collection.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Vehicles => "vehicles",
            Self::MaintenanceRecords => "maintenanceRecords",
            Self::PublicReports => "publicReports",
        }
    }

    /// Older keys read when the primary key has never been written.
    #[must_use]
    pub fn legacy_keys(self) -> &'static [&'static str] {
        match self {
            Self::PublicReports => &["publicFormEntries"],
            Self::Vehicles | Self::MaintenanceRecords => &[],
        }
    }

    /// Look up a collection by its storage key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A record type stored in exactly one collection and identified by an id.
///
/// Ids are opaque strings, unique within the collection and never changed
/// after the record is created.
pub trait Entity: Serialize + DeserializeOwned + Clone + std::fmt::Debug {
    /// The collection this entity is stored in.
    const COLLECTION: Collection;

    /// The record's id.
    fn id(&self) -> &str;

    /// Sample records written the first time a seeded collection loads.
    fn samples() -> Vec<Self> {
        Vec::new()
    }
}

impl Entity for Vehicle {
    const COLLECTION: Collection = Collection::Vehicles;

    fn id(&self) -> &str {
        &self.id
    }

    fn samples() -> Vec<Self> {
        crate::seed::vehicles()
    }
}

impl Entity for MaintenanceRecord {
    const COLLECTION: Collection = Collection::MaintenanceRecords;

    fn id(&self) -> &str {
        &self.id
    }

    fn samples() -> Vec<Self> {
        crate::seed::maintenance_records()
    }
}

impl Entity for PublicReport {
    const COLLECTION: Collection = Collection::PublicReports;

    fn id(&self) -> &str {
        &self.id
    }

    fn samples() -> Vec<Self> {
        crate::seed::public_reports()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_keys() {
        assert_eq!(Collection::Vehicles.key(), "vehicles");
        assert_eq!(Collection::MaintenanceRecords.key(), "maintenanceRecords");
        assert_eq!(Collection::PublicReports.key(), "publicReports");
    }

    #[test]
    fn test_collection_from_key() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_key(collection.key()), Some(collection));
        }
        assert_eq!(Collection::from_key("publicFormEntries"), None);
    }

    #[test]
    fn test_legacy_keys_only_for_reports() {
        assert_eq!(
            Collection::PublicReports.legacy_keys(),
            &["publicFormEntries"]
        );
        assert!(Collection::Vehicles.legacy_keys().is_empty());
        assert!(Collection::MaintenanceRecords.legacy_keys().is_empty());
    }

    #[test]
    fn test_entity_collections() {
        assert_eq!(Vehicle::COLLECTION, Collection::Vehicles);
        assert_eq!(MaintenanceRecord::COLLECTION, Collection::MaintenanceRecords);
        assert_eq!(PublicReport::COLLECTION, Collection::PublicReports);
    }
}
