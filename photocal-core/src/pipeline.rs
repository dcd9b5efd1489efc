//! Photo → event extraction.
//!
//! One request per photo: encode, ask the vision service, pull the JSON
//! payload out of the reply, then validate each field on its own so a partly
//! wrong answer still yields a usable record.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::time::timeout;

use crate::constants::{
    DEFAULT_CONTEXT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, MAX_OUTPUT_TOKENS, TEMPERATURE,
    UNTITLED_EVENT,
};
use crate::error::{PhotocalError, PhotocalResult};
use crate::event::EventRecord;
use crate::extract::{CandidateFields, extract_fields};
use crate::image::ImageSource;
use crate::validate::{validate_date_on, validate_time_at};
use crate::vision::protocol::ChatRequest;
use crate::vision::{Credential, VisionService};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound on the whole vision call.
    pub deadline: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
            deadline: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

pub struct Pipeline<S> {
    service: S,
    settings: PipelineSettings,
    clock: fn() -> NaiveDateTime,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl<S: VisionService> Pipeline<S> {
    pub fn new(service: S, settings: PipelineSettings) -> Self {
        Pipeline {
            service,
            settings,
            clock: local_now,
        }
    }

    /// Replace the wall clock used for date/time fallbacks.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Extract one event from a photo.
    ///
    /// Fails without touching the network when no credential is given.
    pub async fn analyze(
        &self,
        image: &ImageSource,
        credential: Option<&Credential>,
    ) -> PhotocalResult<EventRecord> {
        let credential = credential.ok_or(PhotocalError::CredentialMissing)?;

        let request = ChatRequest::extraction(
            &self.settings.model,
            image.data_url(),
            self.settings.max_tokens,
            self.settings.temperature,
        );

        tracing::debug!(image = ?image, "analyzing photo");

        let response = timeout(
            self.settings.deadline,
            self.service.complete(&request, credential),
        )
        .await
        .map_err(|_| PhotocalError::Timeout(self.settings.deadline.as_secs()))??;

        let content = response.first_content().ok_or_else(|| {
            PhotocalError::MalformedResponse("No content received from the vision API".into())
        })?;

        let fields = extract_fields(content)?;
        Ok(compose_record(fields, image.handle(), (self.clock)()))
    }
}

/// Build a record from raw fields, substituting defaults field by field.
pub fn compose_record(
    fields: CandidateFields,
    photo_url: Option<String>,
    now: NaiveDateTime,
) -> EventRecord {
    let date = validate_date_on(fields.date.as_deref(), now.date());
    let time = validate_time_at(fields.time.as_deref(), now.time());

    if fields.date.as_deref() != Some(date.as_str()) {
        tracing::debug!(raw = ?fields.date, "date replaced with {}", date);
    }
    if fields.time.as_deref() != Some(time.as_str()) {
        tracing::debug!(raw = ?fields.time, "time replaced with {}", time);
    }

    EventRecord::new(
        fields.title.unwrap_or_else(|| UNTITLED_EVENT.to_string()),
        date,
        time,
        fields.context.unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
        photo_url,
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::vision::protocol::ChatResponse;

    /// Vision service fake that replays a scripted reply and counts calls.
    pub(crate) struct ScriptedVision {
        reply: Mutex<Option<PhotocalResult<ChatResponse>>>,
        delay: Duration,
        pub(crate) calls: AtomicUsize,
    }

    impl ScriptedVision {
        pub(crate) fn replying(content: &str) -> Self {
            Self::with_result(Ok(ChatResponse::with_content(content)))
        }

        pub(crate) fn with_result(result: PhotocalResult<ChatResponse>) -> Self {
            ScriptedVision {
                reply: Mutex::new(Some(result)),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VisionService for ScriptedVision {
        async fn complete(
            &self,
            _request: &ChatRequest,
            _credential: &Credential,
        ) -> PhotocalResult<ChatResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(ChatResponse::with_content(r#"{"title":"Again"}"#)))
        }
    }

    pub(crate) fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(18, 42, 9)
            .unwrap()
    }

    pub(crate) fn png() -> ImageSource {
        ImageSource::from_bytes(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], None).unwrap()
    }

    pub(crate) fn key() -> Credential {
        Credential::new("sk-test").unwrap()
    }

    fn pipeline(service: ScriptedVision) -> Pipeline<ScriptedVision> {
        Pipeline::new(service, PipelineSettings::default()).with_clock(fixed_now)
    }

    #[tokio::test]
    async fn invalid_date_and_time_fall_back_to_now() {
        let p = pipeline(ScriptedVision::replying(
            r#"Here is the info: {"title":"Demo","date":"2024-13-40","time":"9:5","context":"Hall"} plus trailing notes"#,
        ));

        let record = p.analyze(&png(), Some(&key())).await.unwrap();

        assert_eq!(record.title, "Demo");
        assert_eq!(record.date, "2025-06-14");
        assert_eq!(record.time, "18:42");
        assert_eq!(record.context, "Hall");
        assert_eq!(record.photo_url, None);
        assert!(!record.id.is_empty());
    }

    #[tokio::test]
    async fn valid_fields_pass_through() {
        let p = pipeline(ScriptedVision::replying(
            r#"{"title":"Jazz Night","date":"March 20, 2024","time":"21:30","context":"Blue Note"}"#,
        ));

        let record = p.analyze(&png(), Some(&key())).await.unwrap();

        assert_eq!(record.title, "Jazz Night");
        assert_eq!(record.date, "2024-03-20");
        assert_eq!(record.time, "21:30");
        assert_eq!(record.context, "Blue Note");
    }

    #[tokio::test]
    async fn missing_fields_get_placeholders() {
        let p = pipeline(ScriptedVision::replying("{}"));

        let record = p.analyze(&png(), Some(&key())).await.unwrap();

        assert_eq!(record.title, "Untitled Event");
        assert_eq!(record.context, "Event location");
        assert_eq!(record.date, "2025-06-14");
        assert_eq!(record.time, "18:42");
    }

    #[tokio::test]
    async fn reply_without_payload_is_malformed() {
        let p = pipeline(ScriptedVision::replying("Sorry, I can't see any event here."));

        let err = p.analyze(&png(), Some(&key())).await.unwrap_err();
        assert!(matches!(err, PhotocalError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn empty_reply_is_malformed() {
        let p = pipeline(ScriptedVision::with_result(Ok(ChatResponse::default())));

        let err = p.analyze(&png(), Some(&key())).await.unwrap_err();
        assert!(matches!(err, PhotocalError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn missing_credential_never_calls_the_service() {
        let p = pipeline(ScriptedVision::replying(r#"{"title":"x"}"#));

        let err = p.analyze(&png(), None).await.unwrap_err();

        assert!(matches!(err, PhotocalError::CredentialMissing));
        assert_eq!(p.service().calls(), 0);
    }

    #[tokio::test]
    async fn upstream_errors_propagate() {
        let p = pipeline(ScriptedVision::with_result(Err(PhotocalError::Upstream {
            status: 401,
            message: "Incorrect API key provided".into(),
        })));

        let err = p.analyze(&png(), Some(&key())).await.unwrap_err();
        assert_eq!(err.to_string(), "Vision API error: 401 - Incorrect API key provided");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_service_hits_the_deadline() {
        let settings = PipelineSettings {
            deadline: Duration::from_secs(5),
            ..PipelineSettings::default()
        };
        let service = ScriptedVision::replying("{}").delayed(Duration::from_secs(30));
        let p = Pipeline::new(service, settings).with_clock(fixed_now);

        let err = p.analyze(&png(), Some(&key())).await.unwrap_err();
        assert!(matches!(err, PhotocalError::Timeout(5)));
    }

    #[test]
    fn compose_record_attaches_photo_handle() {
        let fields = CandidateFields {
            title: Some("Expo".into()),
            ..CandidateFields::default()
        };
        let record = compose_record(fields, Some("file:///tmp/a.png".into()), fixed_now());
        assert_eq!(record.photo_url.as_deref(), Some("file:///tmp/a.png"));
    }
}
