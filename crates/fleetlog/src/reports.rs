//! Derived views over the collections.
//!
//! Everything here is computed from freshly loaded records. Nothing is
//! cached across writes; [`LiveDashboard`] reloads in full whenever the
//! store announces a change.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::model::{
    Collection, MaintenanceRecord, PublicReport, ReportStatus, ServiceType, Vehicle,
};
use crate::storage::KeyValueStore;
use crate::store::{EntityStore, Subscription};

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Headline numbers of the fleet dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Vehicles in the registry.
    pub total_vehicles: usize,
    /// Vehicles whose status is OK.
    pub available_vehicles: usize,
    /// Maintenance records dated in the current month.
    pub maintenance_this_month: usize,
    /// Public reports received.
    pub total_reports: usize,
}

impl DashboardStats {
    /// Compute the stats from loaded collections.
    #[must_use]
    pub fn compute(
        vehicles: &[Vehicle],
        records: &[MaintenanceRecord],
        reports: &[PublicReport],
        today: NaiveDate,
    ) -> Self {
        Self {
            total_vehicles: vehicles.len(),
            available_vehicles: vehicles
                .iter()
                .filter(|v| v.maintenance_status.is_available())
                .count(),
            maintenance_this_month: records.iter().filter(|r| same_month(r.date, today)).count(),
            total_reports: reports.len(),
        }
    }

    /// Load every collection and compute the stats.
    pub fn load<S: KeyValueStore>(store: &EntityStore<S>, today: NaiveDate) -> Self {
        Self::compute(
            &store.load::<Vehicle>(),
            &store.load::<MaintenanceRecord>(),
            &store.load::<PublicReport>(),
            today,
        )
    }
}

/// Totals over the maintenance log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSummary {
    /// Number of records.
    pub total: usize,
    /// Records marked completed.
    pub completed: usize,
    /// Records not completed.
    pub open: usize,
    /// Unfinished tasks across all records.
    pub open_tasks: usize,
    /// Sum of known costs.
    pub total_cost: f64,
}

impl MaintenanceSummary {
    /// Summarize `records`.
    #[must_use]
    pub fn compute(records: &[MaintenanceRecord]) -> Self {
        let completed = records.iter().filter(|r| r.completed).count();
        Self {
            total: records.len(),
            completed,
            open: records.len() - completed,
            open_tasks: records.iter().map(MaintenanceRecord::open_task_count).sum(),
            total_cost: records.iter().map(MaintenanceRecord::cost_or_zero).sum(),
        }
    }
}

/// Cost and count of the records in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// First day of the month.
    pub month: NaiveDate,
    /// Sum of known costs.
    pub cost: f64,
    /// Number of records.
    pub count: usize,
}

/// How many records a service type has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTypeCount {
    /// The service type.
    pub service_type: ServiceType,
    /// Number of records.
    pub count: usize,
}

/// Maintenance costs for the whole fleet or one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostReport {
    /// The vehicle reported on; `None` for the whole fleet.
    pub vehicle_id: Option<String>,
    /// Sum of all known costs.
    pub total_cost: f64,
    /// Sum of known costs of records dated this month.
    pub this_month_cost: f64,
    /// Records dated this month.
    pub this_month_count: usize,
    /// The last twelve months, oldest first, ending with the current one.
    pub monthly: Vec<MonthlyBucket>,
    /// Records per service type, in service type order.
    pub by_service_type: Vec<ServiceTypeCount>,
}

impl CostReport {
    /// Number of months covered by [`CostReport::monthly`].
    pub const MONTHS: u32 = 12;

    /// Build the report over `records`, restricted to `vehicle_id` if given.
    #[must_use]
    pub fn compute(
        records: &[MaintenanceRecord],
        vehicle_id: Option<&str>,
        today: NaiveDate,
    ) -> Self {
        let selected: Vec<&MaintenanceRecord> = records
            .iter()
            .filter(|r| vehicle_id.map_or(true, |id| r.vehicle_id == id))
            .collect();

        let this_month: Vec<&MaintenanceRecord> = selected
            .iter()
            .copied()
            .filter(|r| same_month(r.date, today))
            .collect();

        let current = first_of_month(today);
        let monthly = (0..Self::MONTHS)
            .rev()
            .filter_map(|back| current.checked_sub_months(Months::new(back)))
            .map(|month| {
                let in_month = selected.iter().filter(|r| same_month(r.date, month));
                MonthlyBucket {
                    month,
                    cost: in_month.clone().map(|r| r.cost_or_zero()).sum(),
                    count: in_month.count(),
                }
            })
            .collect();

        let mut distribution: BTreeMap<ServiceType, usize> = BTreeMap::new();
        for record in &selected {
            *distribution.entry(record.service_type).or_default() += 1;
        }

        Self {
            vehicle_id: vehicle_id.map(str::to_string),
            total_cost: selected.iter().map(|r| r.cost_or_zero()).sum(),
            this_month_cost: this_month.iter().map(|r| r.cost_or_zero()).sum(),
            this_month_count: this_month.len(),
            monthly,
            by_service_type: distribution
                .into_iter()
                .map(|(service_type, count)| ServiceTypeCount {
                    service_type,
                    count,
                })
                .collect(),
        }
    }
}

/// Search and status filter over public reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    /// Case-insensitive text matched against driver, barcode and category.
    pub search: String,
    /// Only reports in this state; `None` for all.
    pub status: Option<ReportStatus>,
}

impl ReportQuery {
    /// Whether `report` passes the query.
    #[must_use]
    pub fn matches(&self, report: &PublicReport) -> bool {
        self.status.map_or(true, |status| report.status == status)
            && report.matches_search(&self.search)
    }

    /// The matching reports, in stored order.
    #[must_use]
    pub fn apply<'a>(&self, reports: &'a [PublicReport]) -> Vec<&'a PublicReport> {
        reports.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Number of public reports per review state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// All reports.
    pub all: usize,
    /// Reports not looked at yet.
    pub new: usize,
    /// Reviewed reports.
    pub reviewed: usize,
    /// Processed reports.
    pub processed: usize,
}

impl StatusCounts {
    /// Count `reports` by status.
    #[must_use]
    pub fn compute(reports: &[PublicReport]) -> Self {
        let mut counts = Self {
            all: reports.len(),
            ..Self::default()
        };
        for report in reports {
            match report.status {
                ReportStatus::New => counts.new += 1,
                ReportStatus::Reviewed => counts.reviewed += 1,
                ReportStatus::Processed => counts.processed += 1,
            }
        }
        counts
    }
}

/// Maintenance records dated `date`, optionally for one vehicle only.
#[must_use]
pub fn events_on<'a>(
    records: &'a [MaintenanceRecord],
    date: NaiveDate,
    vehicle_id: Option<&str>,
) -> Vec<&'a MaintenanceRecord> {
    records
        .iter()
        .filter(|r| r.date == date)
        .filter(|r| vehicle_id.map_or(true, |id| r.vehicle_id == id))
        .collect()
}

/// The plate number to show for a record.
///
/// Records keep the plate number the vehicle had when they were created.
/// This returns the vehicle's current plate if the vehicle still exists,
/// otherwise the stored one.
#[must_use]
pub fn current_plate<'a>(record: &'a MaintenanceRecord, vehicles: &'a [Vehicle]) -> &'a str {
    vehicles
        .iter()
        .find(|v| v.id == record.vehicle_id)
        .map_or(record.vehicle_plate_number.as_str(), |v| v.plate_number.as_str())
}

/// Dashboard stats kept current by the store's change notifications.
#[derive(Debug)]
pub struct LiveDashboard<'a, S: KeyValueStore> {
    store: &'a EntityStore<S>,
    subscription: Subscription,
    stats: DashboardStats,
}

impl<'a, S: KeyValueStore> LiveDashboard<'a, S> {
    /// Subscribe to `store` and compute the initial stats.
    pub fn new(store: &'a EntityStore<S>, today: NaiveDate) -> Self {
        let subscription = store.subscribe();
        let stats = DashboardStats::load(store, today);
        Self {
            store,
            subscription,
            stats,
        }
    }

    /// The stats as of the last reload.
    #[must_use]
    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    /// Reload if any change arrived since the last call. Returns whether it
    /// reloaded.
    pub fn refresh(&mut self, today: NaiveDate) -> bool {
        if !self.subscription.changed_any(&Collection::ALL) {
            return false;
        }
        self.reload(today);
        true
    }

    /// Wait for the next change and reload. Returns `None` once the store
    /// is gone.
    pub async fn next_change(&mut self, today: NaiveDate) -> Option<DashboardStats> {
        self.subscription.next().await?;
        self.reload(today);
        Some(self.stats)
    }

    fn reload(&mut self, today: NaiveDate) {
        self.stats = DashboardStats::load(self.store, today);
        debug!(?self.stats, "Dashboard reloaded");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc};

    use super::*;
    use crate::config::SeedConfig;
    use crate::model::{MaintenanceStatus, Task, TripCategory};
    use crate::storage::Storage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, vehicle_id: &str, on: NaiveDate, cost: Option<f64>) -> MaintenanceRecord {
        MaintenanceRecord {
            id: id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            vehicle_plate_number: format!("plate-{vehicle_id}"),
            service_type: ServiceType::OilService,
            date: on,
            notes: String::new(),
            cost,
            added_date: None,
            completed: false,
            tasks: Vec::new(),
            receipt_image: None,
        }
    }

    fn report(id: &str, driver: &str, status: ReportStatus) -> PublicReport {
        PublicReport {
            id: id.to_string(),
            barcode: format!("BAR{id}"),
            images: vec!["a.jpg".to_string()],
            mileage: 1000,
            feature: TripCategory::GuestShuttle,
            date: date(2024, 6, 1),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            driver_name: driver.to_string(),
            notes: String::new(),
            submitted_at: Utc::now(),
            status,
        }
    }

    #[test]
    fn test_dashboard_stats() {
        let vehicles = crate::seed::vehicles();
        let today = date(2024, 3, 20);
        let records = vec![
            record("1", "1", date(2024, 3, 1), None),
            record("2", "1", date(2024, 2, 28), None),
            record("3", "2", date(2023, 3, 5), None),
        ];
        let reports = vec![report("1", "Dana", ReportStatus::New)];

        let stats = DashboardStats::compute(&vehicles, &records, &reports, today);
        assert_eq!(
            stats,
            DashboardStats {
                total_vehicles: 2,
                available_vehicles: 1,
                maintenance_this_month: 1,
                total_reports: 1,
            }
        );
    }

    #[test]
    fn test_maintenance_summary() {
        let mut done = record("1", "1", date(2024, 3, 1), Some(100.0));
        done.completed = true;
        let mut open = record("2", "1", date(2024, 3, 2), Some(50.5));
        open.tasks = vec![
            Task {
                id: "2-1".to_string(),
                description: "a".to_string(),
                completed: false,
            },
            Task {
                id: "2-2".to_string(),
                description: "b".to_string(),
                completed: true,
            },
        ];
        let unknown_cost = record("3", "2", date(2024, 3, 3), None);

        let summary = MaintenanceSummary::compute(&[done, open, unknown_cost]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.open, 2);
        assert_eq!(summary.open_tasks, 1);
        assert!((summary.total_cost - 150.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cost_report_buckets() {
        let today = date(2024, 3, 20);
        let records = vec![
            record("1", "1", date(2024, 3, 1), Some(250.0)),
            record("2", "2", date(2024, 3, 15), Some(100.0)),
            record("3", "1", date(2023, 4, 30), Some(40.0)),
            record("4", "1", date(2023, 3, 31), Some(999.0)),
            record("5", "1", date(2024, 1, 10), None),
        ];

        let report = CostReport::compute(&records, None, today);
        assert_eq!(report.monthly.len(), 12);
        assert_eq!(report.monthly[0].month, date(2023, 4, 1));
        assert_eq!(report.monthly[11].month, date(2024, 3, 1));

        assert_eq!(report.monthly[0].count, 1);
        assert!((report.monthly[0].cost - 40.0).abs() < f64::EPSILON);
        assert_eq!(report.monthly[9].count, 1);
        assert!(report.monthly[9].cost.abs() < f64::EPSILON);
        assert_eq!(report.monthly[11].count, 2);
        assert!((report.monthly[11].cost - 350.0).abs() < f64::EPSILON);

        // Older records count toward the total but not the buckets.
        assert!((report.total_cost - 1389.0).abs() < f64::EPSILON);
        assert_eq!(report.this_month_count, 2);
        assert!((report.this_month_cost - 350.0).abs() < f64::EPSILON);
        assert_eq!(
            report.by_service_type,
            vec![ServiceTypeCount {
                service_type: ServiceType::OilService,
                count: 5
            }]
        );
    }

    #[test]
    fn test_cost_report_for_one_vehicle() {
        let today = date(2024, 3, 20);
        let mut brakes = record("2", "2", date(2024, 3, 15), Some(100.0));
        brakes.service_type = ServiceType::BrakeCheck;
        let records = vec![record("1", "1", date(2024, 3, 1), Some(250.0)), brakes];

        let report = CostReport::compute(&records, Some("2"), today);
        assert_eq!(report.vehicle_id.as_deref(), Some("2"));
        assert!((report.total_cost - 100.0).abs() < f64::EPSILON);
        assert_eq!(report.by_service_type.len(), 1);
        assert_eq!(report.by_service_type[0].service_type, ServiceType::BrakeCheck);
    }

    #[test]
    fn test_cost_report_month_end_today() {
        // Subtracting months from the first of the month never clamps.
        let report = CostReport::compute(&[], None, date(2024, 3, 31));
        assert_eq!(report.monthly[10].month, date(2024, 2, 1));
        assert_eq!(report.monthly[0].month, date(2023, 4, 1));
    }

    #[test]
    fn test_report_query() {
        let reports = vec![
            report("1", "Dana Levi", ReportStatus::New),
            report("2", "Avi Cohen", ReportStatus::Reviewed),
            report("3", "dana k", ReportStatus::Processed),
        ];

        let query = ReportQuery {
            search: "DANA".to_string(),
            status: None,
        };
        let ids: Vec<&str> = query.apply(&reports).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let query = ReportQuery {
            search: "dana".to_string(),
            status: Some(ReportStatus::Processed),
        };
        assert_eq!(query.apply(&reports).len(), 1);

        let query = ReportQuery {
            search: "הסעת".to_string(),
            status: None,
        };
        assert_eq!(query.apply(&reports).len(), 3);

        assert_eq!(ReportQuery::default().apply(&reports).len(), 3);
    }

    #[test]
    fn test_status_counts() {
        let reports = vec![
            report("1", "a", ReportStatus::New),
            report("2", "b", ReportStatus::New),
            report("3", "c", ReportStatus::Processed),
        ];
        assert_eq!(
            StatusCounts::compute(&reports),
            StatusCounts {
                all: 3,
                new: 2,
                reviewed: 0,
                processed: 1,
            }
        );
    }

    #[test]
    fn test_events_on() {
        let day = date(2024, 3, 1);
        let records = vec![
            record("1", "1", day, None),
            record("2", "2", day, None),
            record("3", "1", date(2024, 3, 2), None),
        ];

        assert_eq!(events_on(&records, day, None).len(), 2);
        let for_two = events_on(&records, day, Some("2"));
        assert_eq!(for_two.len(), 1);
        assert_eq!(for_two[0].id, "2");
    }

    #[test]
    fn test_current_plate() {
        let mut vehicles = crate::seed::vehicles();
        let record = record("1", "1", date(2024, 3, 1), None);
        assert_eq!(current_plate(&record, &vehicles), "123-45-678");

        vehicles[0].plate_number = "222-22-222".to_string();
        assert_eq!(current_plate(&record, &vehicles), "222-22-222");

        vehicles.clear();
        assert_eq!(current_plate(&record, &vehicles), "plate-1");
    }

    fn unseeded_store() -> EntityStore {
        EntityStore::with_options(Storage::open_in_memory().unwrap(), SeedConfig::none(), 16)
    }

    #[test]
    fn test_live_dashboard_refresh() {
        let store = unseeded_store();
        let today = date(2024, 3, 20);
        let mut dashboard = LiveDashboard::new(&store, today);
        assert_eq!(dashboard.stats(), DashboardStats::default());
        assert!(!dashboard.refresh(today));

        let mut vehicles = crate::seed::vehicles();
        vehicles[1].maintenance_status = MaintenanceStatus::Ok;
        store.save(&vehicles).unwrap();
        store.upsert(report("1", "Dana", ReportStatus::New)).unwrap();

        assert!(dashboard.refresh(today));
        assert_eq!(dashboard.stats().total_vehicles, 2);
        assert_eq!(dashboard.stats().available_vehicles, 2);
        assert_eq!(dashboard.stats().total_reports, 1);
        assert!(!dashboard.refresh(today));
    }

    #[tokio::test]
    async fn test_live_dashboard_next_change() {
        let store = unseeded_store();
        let today = date(2024, 3, 20);
        let mut dashboard = LiveDashboard::new(&store, today);

        store
            .upsert(record("1", "1", date(2024, 3, 2), Some(10.0)))
            .unwrap();

        let stats = dashboard.next_change(today).await.unwrap();
        assert_eq!(stats.maintenance_this_month, 1);
    }
}
