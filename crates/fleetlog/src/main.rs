//! `fleetctl` - CLI for fleetlog
//!
//! This binary provides the command-line interface for the vehicle registry,
//! the maintenance log and public trip reports.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::Parser;

use fleetlog::cli::{
    Cli, Command, ConfigCommand, CostsCommand, MaintenanceCommand, ReportCommand, StatsCommand,
    StatusCommand, SubmitReport, VehicleCommand,
};
use fleetlog::forms::{MaintenanceForm, PublicReportForm, VehicleForm};
use fleetlog::links::configured_form_url;
use fleetlog::model::{MaintenanceRecord, MaintenanceStatus, PublicReport, ReportStatus, Vehicle};
use fleetlog::reports::{
    current_plate, events_on, CostReport, DashboardStats, MaintenanceSummary, ReportQuery,
    StatusCounts,
};
use fleetlog::{init_logging, Config, EntityStore, IdGenerator};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(db) = cli.db {
        config.storage.database_path = Some(db);
    }

    let open_store = || {
        EntityStore::from_config(&config)
            .with_context(|| format!("opening {}", config.database_path().display()))
    };
    let today = Local::now().date_naive();

    match cli.command {
        Command::Vehicle(cmd) => handle_vehicle(&open_store()?, cmd, today),
        Command::Maintenance(cmd) => handle_maintenance(&open_store()?, cmd, today),
        Command::Report(cmd) => handle_report(&open_store()?, cmd),
        Command::Stats(cmd) => handle_stats(&open_store()?, &cmd, today),
        Command::Costs(cmd) => handle_costs(&open_store()?, &cmd, today),
        Command::Qr(cmd) => handle_qr(&open_store()?, &config, &cmd.vehicle_id),
        Command::Status(cmd) => handle_status(&open_store()?, &config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn find_vehicle(store: &EntityStore, id: &str) -> Result<Vehicle> {
    store
        .get::<Vehicle>(id)
        .with_context(|| format!("no vehicle with id '{id}'"))
}

fn handle_vehicle(store: &EntityStore, cmd: VehicleCommand, today: NaiveDate) -> Result<()> {
    match cmd {
        VehicleCommand::List { json } => {
            let vehicles = store.load::<Vehicle>();
            if json {
                return print_json(&vehicles);
            }
            if vehicles.is_empty() {
                println!("No vehicles registered.");
            }
            for v in &vehicles {
                println!(
                    "{:<14} {:<12} {:<20} {:<18} {:<10} {} (added {})",
                    v.id,
                    v.plate_number,
                    v.model,
                    v.vin,
                    v.barcode,
                    v.maintenance_status,
                    v.added_date
                );
            }
        }
        VehicleCommand::Add {
            plate,
            model,
            vin,
            barcode,
            status,
        } => {
            let form = VehicleForm {
                plate_number: plate,
                model,
                vin,
                barcode: barcode.unwrap_or_default(),
                maintenance_status: status.into(),
            };
            let vehicle = form.create(IdGenerator::new().next_id(), today)?;
            store.upsert(vehicle.clone())?;
            println!("Added vehicle {} ({})", vehicle.plate_number, vehicle.id);
        }
        VehicleCommand::Edit {
            id,
            plate,
            model,
            vin,
            barcode,
            status,
        } => {
            let existing = find_vehicle(store, &id)?;
            let mut form = VehicleForm::from_vehicle(&existing);
            if let Some(plate) = plate {
                form.plate_number = plate;
            }
            if let Some(model) = model {
                form.model = model;
            }
            if let Some(vin) = vin {
                form.vin = vin;
            }
            if let Some(barcode) = barcode {
                form.barcode = barcode;
            }
            if let Some(status) = status {
                form.maintenance_status = status.into();
            }
            let vehicle = form.apply(&existing)?;
            store.upsert(vehicle)?;
            println!("Updated vehicle {id}");
        }
        VehicleCommand::Remove { id } => {
            if store.remove::<Vehicle>(&id)? {
                println!("Removed vehicle {id}");
            } else {
                println!("No vehicle with id '{id}'");
            }
        }
        VehicleCommand::SetStatus { id, status } => {
            let status = MaintenanceStatus::from(status);
            if !store.update::<Vehicle, _>(&id, |v| v.maintenance_status = status)? {
                bail!("no vehicle with id '{id}'");
            }
            println!("Vehicle {id} is now {status}");
        }
    }
    Ok(())
}

fn handle_maintenance(
    store: &EntityStore,
    cmd: MaintenanceCommand,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        MaintenanceCommand::List {
            vehicle,
            date,
            json,
        } => {
            let records = store.load::<MaintenanceRecord>();
            let selected: Vec<&MaintenanceRecord> = match date {
                Some(date) => events_on(&records, date, vehicle.as_deref()),
                None => records
                    .iter()
                    .filter(|r| vehicle.as_deref().map_or(true, |id| r.vehicle_id == id))
                    .collect(),
            };
            if json {
                return print_json(&selected);
            }
            if selected.is_empty() {
                println!("No maintenance records.");
            }
            let vehicles = store.load::<Vehicle>();
            for r in selected {
                let done = if r.completed { "done" } else { "open" };
                let cost = r.cost.map(|c| format!("{c:.2}")).unwrap_or_default();
                println!(
                    "{:<14} {} {:<12} {:<24} {:<4} {:>10}",
                    r.id,
                    r.date,
                    current_plate(r, &vehicles),
                    r.service_type,
                    done,
                    cost
                );
                for task in &r.tasks {
                    let mark = if task.completed { 'x' } else { ' ' };
                    println!("    [{mark}] {} {}", task.id, task.description);
                }
            }
        }
        MaintenanceCommand::Add {
            vehicle,
            service,
            date,
            cost,
            notes,
            tasks,
            receipt,
        } => {
            let form = MaintenanceForm {
                vehicle_id: vehicle,
                service_type: Some(service.into()),
                date: Some(date),
                notes,
                cost: cost.unwrap_or_default(),
                tasks: tasks.join("\n"),
                receipt_image: receipt,
            };
            let vehicles = store.load::<Vehicle>();
            let record = form.create(&vehicles, IdGenerator::new().next_id(), today)?;
            store.upsert(record.clone())?;
            println!(
                "Logged {} for {} ({})",
                record.service_type, record.vehicle_plate_number, record.id
            );
        }
        MaintenanceCommand::Complete { id } => {
            let mut completed = false;
            let found = store.update::<MaintenanceRecord, _>(&id, |r| {
                r.toggle_completed();
                completed = r.completed;
            })?;
            if !found {
                bail!("no maintenance record with id '{id}'");
            }
            let state = if completed { "completed" } else { "open" };
            println!("Record {id} is now {state}");
        }
        MaintenanceCommand::ToggleTask { id, task_id } => {
            let Some(record) = store.get::<MaintenanceRecord>(&id) else {
                bail!("no maintenance record with id '{id}'");
            };
            if !record.has_task(&task_id) {
                bail!("record {id} has no task '{task_id}'");
            }
            store.update::<MaintenanceRecord, _>(&id, |r| {
                r.toggle_task(&task_id);
            })?;
            println!("Toggled task {task_id}");
        }
        MaintenanceCommand::Remove { id } => {
            if store.remove::<MaintenanceRecord>(&id)? {
                println!("Removed maintenance record {id}");
            } else {
                println!("No maintenance record with id '{id}'");
            }
        }
    }
    Ok(())
}

fn submit_report(store: &EntityStore, args: SubmitReport) -> Result<PublicReport> {
    let now = Local::now();
    let (date, time) = (now.date_naive(), now.time());

    let mut form = match &args.link {
        Some(link) => PublicReportForm::from_link(link, date, time),
        None => PublicReportForm::new(date, time),
    };
    if let Some(barcode) = &args.barcode {
        form.set_barcode(barcode)?;
    }
    if let Some(date) = args.date {
        form.date = Some(date);
    }
    if let Some(time) = args.time {
        form.time = time;
    }
    form.images = args.images;
    form.mileage = args.mileage;
    form.feature = Some(args.feature.into());
    form.driver_name = args.driver;
    form.notes = args.notes;

    let report = form.submit(IdGenerator::new().next_id(), Utc::now())?;
    store.upsert(report.clone())?;
    Ok(report)
}

fn handle_report(store: &EntityStore, cmd: ReportCommand) -> Result<()> {
    match cmd {
        ReportCommand::Submit(args) => {
            let report = submit_report(store, args)?;
            println!("Report {} submitted for {}", report.id, report.barcode);
            if !store
                .load::<Vehicle>()
                .iter()
                .any(|v| v.has_barcode(&report.barcode))
            {
                println!("Note: no registered vehicle has barcode '{}'", report.barcode);
            }
        }
        ReportCommand::List {
            search,
            status,
            json,
        } => {
            let reports = store.load::<PublicReport>();
            let query = ReportQuery {
                search: search.unwrap_or_default(),
                status: status.map(ReportStatus::from),
            };
            let selected = query.apply(&reports);
            if json {
                return print_json(&selected);
            }
            let counts = StatusCounts::compute(&reports);
            println!(
                "{} reports: {} new, {} reviewed, {} processed",
                counts.all, counts.new, counts.reviewed, counts.processed
            );
            for r in selected {
                println!(
                    "{:<14} {} {} {:<10} {:<16} {:>8} km {:<20} {}",
                    r.id,
                    r.date,
                    r.time.format("%H:%M"),
                    r.barcode,
                    r.driver_name,
                    r.mileage,
                    r.feature,
                    r.status
                );
            }
        }
        ReportCommand::SetStatus { id, status } => {
            let status = ReportStatus::from(status);
            if !store.update::<PublicReport, _>(&id, |r| r.status = status)? {
                bail!("no report with id '{id}'");
            }
            println!("Report {id} is now {status}");
        }
        ReportCommand::Remove { id } => {
            if store.remove::<PublicReport>(&id)? {
                println!("Removed report {id}");
            } else {
                println!("No report with id '{id}'");
            }
        }
    }
    Ok(())
}

fn handle_stats(store: &EntityStore, cmd: &StatsCommand, today: NaiveDate) -> Result<()> {
    let dashboard = DashboardStats::load(store, today);
    let summary = MaintenanceSummary::compute(&store.load::<MaintenanceRecord>());

    if cmd.json {
        return print_json(&serde_json::json!({
            "dashboard": dashboard,
            "maintenance": summary,
        }));
    }

    println!("Fleet");
    println!("-----");
    println!("Vehicles:              {}", dashboard.total_vehicles);
    println!("Available:             {}", dashboard.available_vehicles);
    println!("Maintenance this month: {}", dashboard.maintenance_this_month);
    println!("Public reports:        {}", dashboard.total_reports);
    println!();
    println!("Maintenance");
    println!("-----------");
    println!("Records:               {}", summary.total);
    println!("Completed:             {}", summary.completed);
    println!("Open:                  {}", summary.open);
    println!("Open tasks:            {}", summary.open_tasks);
    println!("Total cost:            {:.2}", summary.total_cost);
    Ok(())
}

fn handle_costs(store: &EntityStore, cmd: &CostsCommand, today: NaiveDate) -> Result<()> {
    if let Some(id) = &cmd.vehicle {
        find_vehicle(store, id)?;
    }
    let report = CostReport::compute(
        &store.load::<MaintenanceRecord>(),
        cmd.vehicle.as_deref(),
        today,
    );

    if cmd.json {
        return print_json(&report);
    }

    match &report.vehicle_id {
        Some(id) => println!("Costs for vehicle {id}"),
        None => println!("Costs for the whole fleet"),
    }
    println!("Total:       {:.2}", report.total_cost);
    println!(
        "This month:  {:.2} ({} records)",
        report.this_month_cost, report.this_month_count
    );
    println!();
    for bucket in &report.monthly {
        println!(
            "{}  {:>10.2}  {:>3}",
            bucket.month.format("%Y-%m"),
            bucket.cost,
            bucket.count
        );
    }
    println!();
    for entry in &report.by_service_type {
        println!("{:<24} {}", entry.service_type, entry.count);
    }
    Ok(())
}

fn handle_qr(store: &EntityStore, config: &Config, vehicle_id: &str) -> Result<()> {
    let vehicle = find_vehicle(store, vehicle_id)?;
    println!("{}", configured_form_url(&config.public_form, &vehicle.barcode));
    Ok(())
}

fn handle_status(store: &EntityStore, config: &Config, cmd: &StatusCommand) -> Result<()> {
    let stats = store.storage().stats()?;

    if cmd.json {
        return print_json(&serde_json::json!({
            "database_path": config.database_path(),
            "total_keys": stats.total_keys,
            "value_bytes": stats.value_bytes,
            "quota_bytes": stats.quota_bytes,
            "last_write": stats.last_write,
            "db_size_bytes": stats.db_size_bytes,
        }));
    }

    println!("fleetctl status");
    println!("---------------");
    println!("Database:      {}", config.database_path().display());
    println!("Keys:          {}", stats.total_keys);
    if stats.quota_bytes == 0 {
        println!("Stored bytes:  {} (no quota)", stats.value_bytes);
    } else {
        println!("Stored bytes:  {} of {}", stats.value_bytes, stats.quota_bytes);
    }
    match stats.last_write {
        Some(at) => println!("Last write:    {}", at.with_timezone(&Local)),
        None => println!("Last write:    never"),
    }
    println!("File size:     {} bytes", stats.db_size_bytes);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                return print_json(config);
            }
            println!("Current Configuration");
            println!("=====================");
            println!();
            println!("[Storage]");
            println!("  Database path:      {}", config.database_path().display());
            println!("  Quota (bytes):      {}", config.storage.quota_bytes);
            println!();
            println!("[Seed]");
            println!("  Vehicles:           {}", config.seed.vehicles);
            println!("  Maintenance:        {}", config.seed.maintenance_records);
            println!("  Public reports:     {}", config.seed.public_reports);
            println!();
            println!("[Public form]");
            println!("  Base URL:           {}", config.public_form.base_url);
            println!("  Route:              {}", config.public_form.route);
            println!();
            println!("[Notifications]");
            println!(
                "  Channel capacity:   {}",
                config.notifications.channel_capacity
            );
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
