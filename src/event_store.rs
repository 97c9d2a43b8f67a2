use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use log::{debug, error, info, trace, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::{CalError, Event, EventDraft, KeyValueStore, MonthCursor, Result};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "events";

/// File name of a month export, e.g. `events_2024-2.json`.
pub fn export_file_name(cursor: MonthCursor) -> String {
    format!("events_{}-{}.json", cursor.year(), cursor.month())
}

/// Manages the collection of calendar events and its persistence.
///
/// The in-memory collection is authoritative. Before every mutation the
/// stored document is compared with the last text this store read or wrote,
/// and reloaded if another writer changed it.
pub struct EventStore<S> {
    /// Persistence backend
    storage: S,

    /// Key the collection is stored under
    key: String,

    /// Events in insertion order
    events: Vec<Event>,

    /// Stored records that could not be parsed, with their original
    /// position, written back untouched
    unreadable: Vec<(usize, Value)>,

    /// Stored text as of our last read or write
    snapshot: Option<String>,
}

impl<S: KeyValueStore> EventStore<S> {
    /// Opens the store and loads the current collection.
    pub fn open(storage: S, key: impl Into<String>) -> Result<Self> {
        let mut store = Self {
            storage,
            key: key.into(),
            events: Vec::new(),
            unreadable: Vec::new(),
            snapshot: None,
        };
        store.load()?;
        Ok(store)
    }

    /// Reloads the whole collection from storage.
    ///
    /// An absent key is an empty collection. Records that fail to parse are
    /// kept aside and never match any query. Records stored in an older form
    /// (no id, label-form day) are written back in canonical form right away
    /// so their ids stay stable across loads.
    ///
    /// # Returns
    ///
    /// The number of events loaded
    pub fn load(&mut self) -> Result<usize> {
        let text = self.storage.get(&self.key)?;

        let (events, unreadable, migrated) = match text.as_deref() {
            Some(text) => parse_collection(text)?,
            None => (Vec::new(), Vec::new(), false),
        };

        if !unreadable.is_empty() {
            error!(
                "Encountered {} unreadable records under '{}'",
                unreadable.len(),
                self.key
            );
        }

        self.events = events;
        self.unreadable = unreadable;
        self.snapshot = text;

        info!("Loaded {} events from '{}'", self.events.len(), self.key);

        if migrated {
            info!("Rewriting '{}' in canonical form", self.key);
            if let Err(e) = self.persist() {
                warn!("Failed to rewrite '{}': {}", self.key, e);
            }
        }

        Ok(self.events.len())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of stored records that could not be parsed.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.len()
    }

    pub fn get(&self, id: Uuid) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Events on `date`, in insertion order.
    pub fn list_for_day(&self, date: NaiveDate) -> Vec<&Event> {
        self.events.iter().filter(|event| event.day == date).collect()
    }

    pub fn count_for_day(&self, date: NaiveDate) -> usize {
        self.events.iter().filter(|event| event.day == date).count()
    }

    /// Case-insensitive substring search on event names, within one day only.
    pub fn search_day(&self, date: NaiveDate, term: &str) -> Vec<&Event> {
        let needle = term.trim().to_lowercase();
        self.list_for_day(date)
            .into_iter()
            .filter(|event| needle.is_empty() || event.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Events falling in the given month, in insertion order.
    pub fn events_in_month(&self, cursor: MonthCursor) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| cursor.contains(event.day))
            .collect()
    }

    /// Adds an event on `selected_day` of the displayed month.
    ///
    /// Nothing is written if validation fails.
    pub fn add(
        &mut self,
        draft: &EventDraft,
        selected_day: Option<u32>,
        cursor: MonthCursor,
    ) -> Result<Event> {
        let day = selected_day.ok_or(CalError::NoDaySelected)?;
        draft.validate()?;
        let date = cursor.date(day).ok_or(CalError::InvalidDay {
            day,
            month: cursor.month(),
            year: cursor.year(),
        })?;

        self.sync_if_changed()?;

        if self.events.iter().any(|e| e.conflicts_with(&draft.name, date)) {
            debug!("Rejecting duplicate event '{}' on {}", draft.name, date);
            return Err(CalError::duplicate(&draft.name, date));
        }

        let event = Event::new(draft, date)?;
        info!("Adding event {} '{}' on {}", event.id, event.name, date);

        let previous = self.events.clone();
        self.events.push(event.clone());
        self.commit(previous)?;

        Ok(event)
    }

    /// Replaces the fields of the event with `id` by the edited values.
    /// The event keeps its id and day.
    pub fn update(&mut self, id: Uuid, draft: &EventDraft) -> Result<Event> {
        let (start_time, end_time) = draft.validate()?;

        self.sync_if_changed()?;

        let index = self.position(id)?;
        let day = self.events[index].day;

        if self
            .events
            .iter()
            .any(|e| e.id != id && e.conflicts_with(&draft.name, day))
        {
            debug!("Rejecting update of {}: name collides on {}", id, day);
            return Err(CalError::duplicate(&draft.name, day));
        }

        let updated = Event {
            id,
            name: draft.name.trim().to_string(),
            start_time,
            end_time,
            description: draft.description.clone(),
            day,
            event_type: draft.event_type,
        };
        info!("Updating event {}", id);

        let previous = self.events.clone();
        self.events[index] = updated.clone();
        self.commit(previous)?;

        Ok(updated)
    }

    /// Removes the event with `id`, returning it.
    pub fn delete(&mut self, id: Uuid) -> Result<Event> {
        self.sync_if_changed()?;

        let index = self.position(id)?;
        info!("Deleting event {}", id);

        let previous = self.events.clone();
        let removed = self.events.remove(index);
        self.commit(previous)?;

        Ok(removed)
    }

    /// Serializes the events of one month as indented JSON.
    pub fn export_json(&self, cursor: MonthCursor) -> Result<String> {
        let events = self.events_in_month(cursor);
        debug!("Exporting {} events for {}", events.len(), cursor.label());
        Ok(serde_json::to_string_pretty(&events)?)
    }

    /// Writes the month export into `dir`, returning the file path.
    pub fn export(&self, cursor: MonthCursor, dir: &Path) -> Result<PathBuf> {
        if !dir.exists() {
            debug!("Creating export directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create export directory: {}", e);
                CalError::DirectoryError {
                    path: dir.to_path_buf(),
                }
            })?;
        }

        let path = dir.join(export_file_name(cursor));
        let json = self.export_json(cursor)?;
        fs::write(&path, json).map_err(|e| {
            error!("Failed to write export {}: {}", path.display(), e);
            CalError::Io(e)
        })?;

        info!("Exported {} to {}", cursor.label(), path.display());
        Ok(path)
    }

    fn position(&self, id: Uuid) -> Result<usize> {
        self.events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| CalError::EventNotFound { id: id.to_string() })
    }

    /// Reloads if the stored document differs from our snapshot.
    fn sync_if_changed(&mut self) -> Result<()> {
        let current = self.storage.get(&self.key)?;
        if current != self.snapshot {
            info!("'{}' was changed by another writer, reloading", self.key);
            self.load()?;
        }
        Ok(())
    }

    /// Persists the collection, restoring `previous` if the write fails.
    fn commit(&mut self, previous: Vec<Event>) -> Result<()> {
        match self.persist() {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Write to '{}' failed, discarding change: {}", self.key, e);
                self.events = previous;
                Err(e)
            }
        }
    }

    fn persist(&mut self) -> Result<()> {
        let mut records = Vec::with_capacity(self.events.len() + self.unreadable.len());
        for event in &self.events {
            records.push(serde_json::to_value(event)?);
        }
        // `unreadable` is in ascending index order, so inserting in turn puts
        // each record back where it was.
        for (index, record) in &self.unreadable {
            let index = (*index).min(records.len());
            records.insert(index, record.clone());
        }

        let text = serde_json::to_string_pretty(&records)?;

        trace!("Writing {} records to '{}'", records.len(), self.key);
        let written = self
            .storage
            .compare_and_set(&self.key, self.snapshot.as_deref(), &text)?;
        if !written {
            error!("Lost a write race on '{}'", self.key);
            return Err(CalError::ConcurrentModification {
                key: self.key.clone(),
            });
        }

        self.snapshot = Some(text);
        Ok(())
    }
}

/// Splits a stored document into parsed events and unparseable records
/// (with their position), and reports whether any parsed record was not
/// stored in canonical form.
fn parse_collection(text: &str) -> Result<(Vec<Event>, Vec<(usize, Value)>, bool)> {
    let records: Vec<Value> = serde_json::from_str(text)?;

    let mut events = Vec::with_capacity(records.len());
    let mut unreadable = Vec::new();
    let mut migrated = false;

    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Event>(record.clone()) {
            Ok(event) => {
                if serde_json::to_value(&event)? != record {
                    trace!("Record {} needs migration", index);
                    migrated = true;
                }
                events.push(event);
            }
            Err(e) => {
                warn!("Skipping unreadable event record {}: {}", index, e);
                unreadable.push((index, record));
            }
        }
    }

    Ok((events, unreadable, migrated))
}
