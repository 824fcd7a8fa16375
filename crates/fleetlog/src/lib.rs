//! `fleetlog` - Fleet registry, maintenance log and public trip reports
//!
//! This library keeps three collections (vehicles, maintenance records and
//! drivers' public reports) as JSON arrays in a local key-value store, and
//! derives dashboard and cost reports from them.
//!
//! [`EntityStore`] is the only reader and writer of the collections. Every
//! write replaces a whole collection and is announced to subscribers so that
//! derived views can reload.
//!
//! ```no_run
//! use fleetlog::{model::Vehicle, EntityStore, Storage};
//!
//! # fn main() -> fleetlog::Result<()> {
//! let store = EntityStore::new(Storage::open("fleet.db")?);
//! for vehicle in store.load::<Vehicle>() {
//!     println!("{} {}", vehicle.plate_number, vehicle.maintenance_status);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod forms;
pub mod ids;
pub mod links;
pub mod logging;
pub mod model;
pub mod reports;
pub mod seed;
pub mod storage;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use ids::IdGenerator;
pub use logging::init_logging;
pub use model::{Collection, Entity};
pub use storage::{KeyValueStore, Storage, StorageStats};
pub use store::{EntityStore, StoreEvent, Subscription, UpsertOutcome};
