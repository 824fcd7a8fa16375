//! The entity store.
//!
//! [`EntityStore`] is the single reader and writer of the collections. Each
//! collection is one JSON array under its key in a [`KeyValueStore`]; every
//! operation loads the whole array and every write replaces it
//! (last-write-wins). Successful writes are announced on a [`ChangeFeed`].

pub mod events;

use tracing::{debug, info, warn};

use crate::config::{Config, SeedConfig};
use crate::error::{Error, Result};
use crate::model::{Collection, Entity};
use crate::storage::{KeyValueStore, Storage};

pub use events::{Change, ChangeFeed, StoreEvent, Subscription};

/// Events buffered per subscriber when no configuration is given.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// What an [`EntityStore::upsert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record had the id; the record was appended.
    Inserted,
    /// A record with the id was replaced in place.
    Replaced,
}

/// Parsed records of a stored collection.
struct StoredRecords<E> {
    records: Vec<E>,
    unreadable: usize,
}

/// Load/save access to the collections, with change notification.
#[derive(Debug)]
pub struct EntityStore<S = Storage> {
    storage: S,
    seed: SeedConfig,
    feed: ChangeFeed,
}

impl EntityStore<Storage> {
    /// Open the configured database and build a store around it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?.with_quota(config.storage.quota_bytes);
        Ok(Self::with_options(
            storage,
            config.seed,
            config.notifications.channel_capacity,
        ))
    }
}

impl<S: KeyValueStore> EntityStore<S> {
    /// Create a store with the default seeding and notification settings.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_options(storage, SeedConfig::default(), DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a store with explicit seeding and channel capacity.
    #[must_use]
    pub fn with_options(storage: S, seed: SeedConfig, channel_capacity: usize) -> Self {
        Self {
            storage,
            seed,
            feed: ChangeFeed::new(channel_capacity),
        }
    }

    /// The underlying key-value storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Receive a [`StoreEvent`] for every successful write from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    /// Load every record of `E`'s collection.
    ///
    /// Never fails. A key that was never written yields the sample records
    /// if the collection is seeded, otherwise nothing. A stored value that
    /// cannot be read or is not a JSON array is logged and yields nothing;
    /// single records that fail to parse are logged and skipped.
    pub fn load<E: Entity>(&self) -> Vec<E> {
        let collection = E::COLLECTION;

        match self.read_records::<E>() {
            Ok(Some(stored)) => {
                debug!(
                    %collection,
                    count = stored.records.len(),
                    skipped = stored.unreadable,
                    "Loaded collection"
                );
                stored.records
            }
            Ok(None) => self.seed_or_empty(),
            Err(err) => {
                warn!(%collection, error = %err, "Failed to read collection, treating as empty");
                Vec::new()
            }
        }
    }

    /// Look up one record by id.
    pub fn get<E: Entity>(&self, id: &str) -> Option<E> {
        self.load::<E>().into_iter().find(|r| r.id() == id)
    }

    /// Replace the whole collection with `records`.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be serialized or the storage
    /// rejects the write. The stored value is unchanged and no event is
    /// published then.
    pub fn save<E: Entity>(&self, records: &[E]) -> Result<()> {
        self.write(E::COLLECTION, records)?;
        self.feed.publish(E::COLLECTION);
        Ok(())
    }

    /// Replace the record with the same id, or append it.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored collection cannot be read in full or
    /// cannot be saved.
    pub fn upsert<E: Entity>(&self, record: E) -> Result<UpsertOutcome> {
        let mut records = self.load_for_write::<E>()?;

        let outcome = match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => {
                *existing = record;
                UpsertOutcome::Replaced
            }
            None => {
                records.push(record);
                UpsertOutcome::Inserted
            }
        };

        self.save(&records)?;
        Ok(outcome)
    }

    /// Apply `mutation` to the record with `id` and save.
    ///
    /// Returns `false`, without writing, if no record has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored collection cannot be read in full or
    /// cannot be saved.
    pub fn update<E, F>(&self, id: &str, mutation: F) -> Result<bool>
    where
        E: Entity,
        F: FnOnce(&mut E),
    {
        let mut records = self.load_for_write::<E>()?;

        let Some(record) = records.iter_mut().find(|r| r.id() == id) else {
            debug!(collection = %E::COLLECTION, id, "No record to update");
            return Ok(false);
        };
        mutation(record);

        self.save(&records)?;
        Ok(true)
    }

    /// Drop the record with `id` and save.
    ///
    /// The collection is saved even if nothing matched. Returns whether a
    /// record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored collection cannot be read in full or
    /// cannot be saved.
    pub fn remove<E: Entity>(&self, id: &str) -> Result<bool> {
        let mut records = self.load_for_write::<E>()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        let removed = records.len() < before;

        self.save(&records)?;
        Ok(removed)
    }

    /// Records a read-modify-write starts from.
    ///
    /// Unlike [`Self::load`], any stored record that does not parse is an
    /// error, so the write cannot drop it.
    fn load_for_write<E: Entity>(&self) -> Result<Vec<E>> {
        let collection = E::COLLECTION;
        match self.read_records::<E>()? {
            None => Ok(self.seed_or_empty()),
            Some(stored) if stored.unreadable > 0 => {
                warn!(%collection, unreadable = stored.unreadable, "Refusing to overwrite unreadable records");
                Err(Error::malformed(
                    collection,
                    format!("{} stored record(s) failed to parse", stored.unreadable),
                ))
            }
            Some(stored) => Ok(stored.records),
        }
    }

    /// Parse the stored collection record by record.
    ///
    /// `Ok(None)` means nothing is stored. A value that is not a JSON array
    /// is an error; records inside it that fail to parse are counted.
    fn read_records<E: Entity>(&self) -> Result<Option<StoredRecords<E>>> {
        let collection = E::COLLECTION;
        let Some(raw) = self.read_raw(collection)? else {
            return Ok(None);
        };

        let items: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|err| Error::malformed(collection, err.to_string()))?;

        let mut stored = StoredRecords {
            records: Vec::with_capacity(items.len()),
            unreadable: 0,
        };
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<E>(item) {
                Ok(record) => stored.records.push(record),
                Err(err) => {
                    warn!(%collection, index, error = %err, "Skipping unreadable record");
                    stored.unreadable += 1;
                }
            }
        }
        Ok(Some(stored))
    }

    /// Raw value under the collection's key, falling back to legacy keys.
    fn read_raw(&self, collection: Collection) -> Result<Option<String>> {
        if let Some(raw) = self.storage.get(collection.key())? {
            return Ok(Some(raw));
        }

        for legacy in collection.legacy_keys() {
            if let Some(raw) = self.storage.get(legacy)? {
                info!(%collection, legacy_key = legacy, "Reading collection from legacy key");
                return Ok(Some(raw));
            }
        }

        Ok(None)
    }

    /// Sample records for a never-written collection, persisted if seeding
    /// is enabled for it.
    fn seed_or_empty<E: Entity>(&self) -> Vec<E> {
        let collection = E::COLLECTION;
        if !self.seed.enabled_for(collection) {
            return Vec::new();
        }

        let samples = E::samples();
        match self.write(collection, &samples) {
            Ok(()) => info!(%collection, count = samples.len(), "Seeded collection with sample data"),
            Err(err) => warn!(%collection, error = %err, "Failed to persist sample data"),
        }
        samples
    }

    fn write<E: Entity>(&self, collection: Collection, records: &[E]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.storage.set(collection.key(), &raw)?;
        debug!(%collection, count = records.len(), bytes = raw.len(), "Saved collection");
        Ok(())
    }
}
