//! Saved events.
//!
//! The whole collection lives in one key-value slot as a JSON array. Every
//! mutation re-reads the slot, applies the change and writes the full
//! collection back. Storage failures are logged and never fatal: a bad read
//! means an empty calendar, a bad write keeps the change in memory only.

mod kv;

pub use kv::{FileKeyValue, KeyValue, MemoryKeyValue};

use crate::constants::STORAGE_KEY;
use crate::error::{PhotocalError, PhotocalResult};
use crate::event::EventRecord;

pub struct EventStore {
    kv: Box<dyn KeyValue>,
    key: String,
    events: Vec<EventRecord>,
    /// Set while the slot is behind memory because a write failed.
    unsaved: bool,
}

impl EventStore {
    /// Open the default event slot.
    pub fn open(kv: impl KeyValue + 'static) -> Self {
        Self::open_slot(kv, STORAGE_KEY)
    }

    pub fn open_slot(kv: impl KeyValue + 'static, key: &str) -> Self {
        let mut store = EventStore {
            kv: Box::new(kv),
            key: key.to_string(),
            events: Vec::new(),
            unsaved: false,
        };

        match store.load() {
            Ok(events) => store.events = events,
            Err(e) => tracing::warn!("Failed to load events from storage: {}", e),
        }

        tracing::debug!(count = store.events.len(), "event store opened");
        store
    }

    /// Saved events in insertion order.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Append a record. Returns false (and stores nothing) if its id is taken.
    pub fn add(&mut self, record: EventRecord) -> bool {
        self.mutate(|events| {
            if events.iter().any(|e| e.id == record.id) {
                tracing::warn!(id = %record.id, "refusing to add event with duplicate id");
                return (false, false);
            }
            events.push(record);
            (true, true)
        })
    }

    /// Replace the record with the same id. Returns false if there is none.
    pub fn update(&mut self, record: EventRecord) -> bool {
        self.mutate(|events| match events.iter_mut().find(|e| e.id == record.id) {
            Some(existing) => {
                let changed = *existing != record;
                *existing = record;
                (true, changed)
            }
            None => (false, false),
        })
    }

    /// Delete by id, returning the removed record.
    pub fn remove(&mut self, id: &str) -> Option<EventRecord> {
        self.mutate(|events| match events.iter().position(|e| e.id == id) {
            Some(index) => (Some(events.remove(index)), true),
            None => (None, false),
        })
    }

    /// Read-modify-write. `apply` returns its result and whether it changed
    /// anything worth persisting.
    fn mutate<R>(&mut self, apply: impl FnOnce(&mut Vec<EventRecord>) -> (R, bool)) -> R {
        self.refresh();

        let (result, changed) = apply(&mut self.events);

        if changed || self.unsaved {
            match self.persist() {
                Ok(()) => self.unsaved = false,
                Err(e) => {
                    tracing::warn!("Failed to save events to storage: {}", e);
                    self.unsaved = true;
                }
            }
        }

        result
    }

    /// Pick up writes made by other handles on the same slot.
    fn refresh(&mut self) {
        if self.unsaved {
            return;
        }
        match self.load() {
            Ok(events) => self.events = events,
            Err(e) => tracing::warn!("Keeping in-memory events, reload failed: {}", e),
        }
    }

    fn load(&self) -> PhotocalResult<Vec<EventRecord>> {
        match self.kv.get(&self.key)? {
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| PhotocalError::Storage(format!("Could not parse saved events: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self) -> PhotocalResult<()> {
        let content = serde_json::to_string(&self.events)
            .map_err(|e| PhotocalError::Storage(e.to_string()))?;
        self.kv.set(&self.key, &content)
    }
}
