//! Upload → review → save orchestration.
//!
//! The controller owns the event store, the session credential and a single
//! pending slot. An upload claims the slot for its whole duration, so at most
//! one extraction is in flight and at most one record waits for review.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use crate::error::{PhotocalError, PhotocalResult};
use crate::event::EventRecord;
use crate::image::ImageSource;
use crate::pipeline::Pipeline;
use crate::store::EventStore;
use crate::vision::{Credential, VisionService};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Idle,
    Processing,
    Pending(EventRecord),
}

pub struct Controller<S> {
    pipeline: Pipeline<S>,
    store: EventStore,
    credential: Option<Credential>,
    slot: Mutex<Slot>,
}

/// Exclusive hold on the pending slot for one upload. Dropping it without
/// settling puts the slot back to idle.
struct Claim<'a> {
    slot: &'a Mutex<Slot>,
    settled: bool,
}

impl Claim<'_> {
    fn settle(mut self, record: EventRecord) {
        *lock(self.slot) = Slot::Pending(record);
        self.settled = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *lock(self.slot) = Slot::Idle;
        }
    }
}

// The slot holds plain data, so a poisoned lock is still usable.
fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<S: VisionService> Controller<S> {
    pub fn new(pipeline: Pipeline<S>, store: EventStore) -> Self {
        Controller {
            pipeline,
            store,
            credential: None,
            slot: Mutex::new(Slot::Idle),
        }
    }

    /// Set the session API key. Blank input clears it.
    pub fn set_credential(&mut self, value: &str) {
        self.credential = Credential::new(value);
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn is_processing(&self) -> bool {
        *lock(&self.slot) == Slot::Processing
    }

    /// The extracted record waiting for review, if any.
    pub fn pending(&self) -> Option<EventRecord> {
        match &*lock(&self.slot) {
            Slot::Pending(record) => Some(record.clone()),
            _ => None,
        }
    }

    pub fn events(&self) -> &[EventRecord] {
        self.store.events()
    }

    pub fn get(&self, id: &str) -> Option<&EventRecord> {
        self.store.get(id)
    }

    pub async fn upload(&self, image: ImageSource) -> PhotocalResult<EventRecord> {
        self.upload_until(image, std::future::pending()).await
    }

    /// Analyze a photo into the pending slot, giving up if `cancel` resolves
    /// first.
    pub async fn upload_until<F>(&self, image: ImageSource, cancel: F) -> PhotocalResult<EventRecord>
    where
        F: Future<Output = ()>,
    {
        let credential = self
            .credential
            .as_ref()
            .ok_or(PhotocalError::CredentialMissing)?;

        let claim = self.claim()?;

        let record = tokio::select! {
            result = self.pipeline.analyze(&image, Some(credential)) => result?,
            _ = cancel => {
                tracing::debug!("upload cancelled");
                return Err(PhotocalError::Cancelled);
            }
        };

        claim.settle(record.clone());
        Ok(record)
    }

    fn claim(&self) -> PhotocalResult<Claim<'_>> {
        let mut slot = lock(&self.slot);
        match *slot {
            Slot::Processing => Err(PhotocalError::Busy),
            Slot::Pending(_) => Err(PhotocalError::PendingUnresolved),
            Slot::Idle => {
                *slot = Slot::Processing;
                Ok(Claim {
                    slot: &self.slot,
                    settled: false,
                })
            }
        }
    }

    /// Commit the reviewed record (possibly edited) to the store.
    pub fn save(&mut self, record: EventRecord) -> PhotocalResult<()> {
        {
            let slot = lock(&self.slot);
            match &*slot {
                Slot::Pending(pending) if pending.id == record.id => {}
                Slot::Pending(_) => return Err(PhotocalError::PendingMismatch(record.id)),
                _ => return Err(PhotocalError::NothingPending),
            }
        }

        record.check()?;

        let id = record.id.clone();
        if !self.store.add(record) {
            return Err(PhotocalError::DuplicateId(id));
        }

        *lock(&self.slot) = Slot::Idle;
        Ok(())
    }

    /// Discard the pending record.
    pub fn cancel(&self) -> Option<EventRecord> {
        let mut slot = lock(&self.slot);
        match std::mem::replace(&mut *slot, Slot::Idle) {
            Slot::Pending(record) => Some(record),
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Edit a saved record in place.
    pub fn update(&mut self, record: EventRecord) -> PhotocalResult<bool> {
        record.check()?;
        Ok(self.store.update(record))
    }

    pub fn remove(&mut self, id: &str) -> Option<EventRecord> {
        self.store.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::pipeline::PipelineSettings;
    use crate::pipeline::tests::{ScriptedVision, fixed_now, png};
    use crate::store::MemoryKeyValue;

    const REPLY: &str = r#"{"title":"Farmers Market","date":"2024-06-01","time":"08:00","context":"Main St"}"#;

    fn controller(service: ScriptedVision) -> Controller<ScriptedVision> {
        let pipeline = Pipeline::new(service, PipelineSettings::default()).with_clock(fixed_now);
        let mut c = Controller::new(pipeline, EventStore::open(MemoryKeyValue::new()));
        c.set_credential("sk-test");
        c
    }

    #[tokio::test]
    async fn upload_then_save_commits_to_store() {
        let mut c = controller(ScriptedVision::replying(REPLY));

        let record = c.upload(png()).await.unwrap();
        assert_eq!(c.pending(), Some(record.clone()));
        assert!(c.events().is_empty());

        let mut edited = record.clone();
        edited.title = "Saturday Market".to_string();
        c.save(edited.clone()).unwrap();

        assert_eq!(c.pending(), None);
        assert_eq!(c.events(), &[edited]);
    }

    #[tokio::test]
    async fn upload_without_credential_fails_before_claiming() {
        let mut c = controller(ScriptedVision::replying(REPLY));
        c.set_credential("   ");

        let err = c.upload(png()).await.unwrap_err();

        assert!(matches!(err, PhotocalError::CredentialMissing));
        assert!(!c.is_processing());
        assert_eq!(c.pipeline.service().calls(), 0);
    }

    #[tokio::test]
    async fn pending_record_blocks_next_upload() {
        let c = controller(ScriptedVision::replying(REPLY));
        c.upload(png()).await.unwrap();

        let err = c.upload(png()).await.unwrap_err();
        assert!(matches!(err, PhotocalError::PendingUnresolved));

        c.cancel().unwrap();
        assert!(c.upload(png()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_upload_is_rejected_as_busy() {
        let c = controller(ScriptedVision::replying(REPLY).delayed(Duration::from_secs(2)));

        let (first, second) = tokio::join!(c.upload(png()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(c.is_processing());
            c.upload(png()).await
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(PhotocalError::Busy)));
        assert_eq!(c.pipeline.service().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_upload_releases_the_slot() {
        let c = controller(ScriptedVision::replying(REPLY).delayed(Duration::from_secs(30)));

        let err = c
            .upload_until(png(), tokio::time::sleep(Duration::from_secs(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, PhotocalError::Cancelled));
        assert!(!c.is_processing());
        assert_eq!(c.pending(), None);
    }

    #[tokio::test]
    async fn failed_upload_releases_the_slot() {
        let c = controller(ScriptedVision::replying("no json here"));

        assert!(c.upload(png()).await.is_err());
        assert!(!c.is_processing());

        // Scripted reply is consumed; the fallback reply succeeds
        assert!(c.upload(png()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_upload_releases_the_slot() {
        let c = controller(ScriptedVision::replying(REPLY).delayed(Duration::from_secs(30)));

        let _ = tokio::time::timeout(Duration::from_secs(1), c.upload(png())).await;

        assert!(!c.is_processing());
    }

    #[tokio::test]
    async fn save_requires_the_pending_record() {
        let mut c = controller(ScriptedVision::replying(REPLY));
        let stray = EventRecord::new("x", "2024-01-01", "10:00", "", None);

        assert!(matches!(c.save(stray.clone()), Err(PhotocalError::NothingPending)));

        c.upload(png()).await.unwrap();
        assert!(matches!(c.save(stray), Err(PhotocalError::PendingMismatch(_))));
        assert!(c.events().is_empty());
    }

    #[tokio::test]
    async fn save_rejects_invalid_edits_and_keeps_pending() {
        let mut c = controller(ScriptedVision::replying(REPLY));
        let mut record = c.upload(png()).await.unwrap();
        record.time = "25:00".to_string();

        assert!(matches!(c.save(record), Err(PhotocalError::InvalidRecord(_))));
        assert!(c.pending().is_some());
    }

    #[tokio::test]
    async fn save_reports_an_id_already_in_the_store() {
        let mut c = controller(ScriptedVision::replying(REPLY));
        let record = c.upload(png()).await.unwrap();
        c.store.add(record.clone());

        let err = c.save(record.clone()).unwrap_err();

        assert!(matches!(err, PhotocalError::DuplicateId(ref id) if *id == record.id));
        assert_eq!(c.pending(), Some(record));
        assert_eq!(c.events().len(), 1);
    }

    #[tokio::test]
    async fn cancel_discards_pending_record() {
        let c = controller(ScriptedVision::replying(REPLY));
        let record = c.upload(png()).await.unwrap();

        assert_eq!(c.cancel(), Some(record));
        assert_eq!(c.cancel(), None);
        assert!(c.events().is_empty());
    }

    #[tokio::test]
    async fn saved_records_can_be_updated_and_removed() {
        let mut c = controller(ScriptedVision::replying(REPLY));
        let record = c.upload(png()).await.unwrap();
        c.save(record.clone()).unwrap();

        let mut moved = record.clone();
        moved.date = "2024-06-08".to_string();
        assert!(c.update(moved.clone()).unwrap());
        assert_eq!(c.get(&record.id), Some(&moved));

        let mut broken = moved.clone();
        broken.date = "June 8".to_string();
        assert!(c.update(broken).is_err());
        assert_eq!(c.events(), &[moved]);

        assert!(c.remove(&record.id).is_some());
        assert!(c.events().is_empty());
    }
}
